//! # Machine Control Core
//!
//! Machine-level hardware control surface for embedded devices:
//! low-power deep sleep with configurable wake sources, unbiased bounded
//! random numbers from a hardware entropy source, interrupt-safe
//! critical sections, and a raw/line serial console mode switch.
//!
//! ## Features
//! - Unbiased rejection sampling over arbitrary closed intervals
//! - Nestable save/restore interrupt guard with move-only restore tokens
//! - Multi-source deep-sleep arming (timer, EXT0, EXT1, touch) with
//!   boot cause reporting
//! - Mutex-guarded raw console mode with timed partial reads
//! - CPU frequency validation, unique chip id, free-heap reporting
//!
//! ## Safety Guarantees
//! - No heap allocation (suitable for constrained microcontrollers)
//! - Irreversible transitions (deep sleep, restart) are diverging
//!   operations, so unreachable post-transition code cannot be written
//! - Compile-time memory safety, no unsafe code
//!
//! Platform access goes through small port traits; the `std` feature
//! provides host implementations for development and testing, the
//! `esp32` feature the hardware-backed ones.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
#![deny(warnings)]
// Standard clippy allows
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::use_self)]
#![allow(clippy::manual_range_contains)]

/// Raw console mode switching and the shared raw-mode flag
pub mod console;
/// Hardware entropy source adapter
pub mod entropy;
/// Host simulation ports for development and testing
#[cfg(feature = "std")]
pub mod host;
/// Processor-level interrupt guard with nestable restore tokens
pub mod irq;
/// Unbiased bounded random sampling by rejection
pub mod random;
/// Deep-sleep entry orchestration
pub mod sleep;
/// System queries: CPU frequency, unique id, heap, restart
pub mod system;
/// Core types (MachineError, Result)
pub mod types;
/// Wake source configuration and boot cause reporting
pub mod wake;

// Re-export core types for convenience
pub use types::*;
// Re-export the primary entry points
pub use entropy::EntropySource;
pub use random::BoundedRng;
pub use sleep::SleepController;
pub use wake::{ResetCause, WakeCause, WakeConfig, WakeStatus};

//! Host-side port implementations
//!
//! Desktop stand-ins for every platform seam so the full surface runs in
//! simulation: deterministic entropy, a recording sleep port, an
//! in-memory console transport, fixed cause registers, and a fake system
//! port. Used by the test suite and the runnable demos; no hardware
//! required.
//!
//! Diverging operations (deep-sleep entry, restart) are modeled as
//! panics: on the device they end the program in a reset, on the host
//! the unwind plays that role and tests observe it with `catch_unwind`.

use std::sync::{Arc, Mutex};

use crate::console::ConsoleTransport;
use crate::entropy::EntropySource;
use crate::sleep::{PeripheralShutdown, SleepPort};
use crate::system::{CpuFrequency, HeapStats, SystemPort};
use crate::types::Result;
use crate::wake::{CauseRegisters, Ext1Trigger};

/// Deterministic entropy source (splitmix64).
///
/// Statistically solid enough for uniformity tests while keeping runs
/// repeatable; not a substitute for the hardware source.
pub struct SeededEntropy {
    state: u64,
}

impl SeededEntropy {
    /// Create a generator from a fixed seed.
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl EntropySource for SeededEntropy {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 32) as u32
    }
}

/// Entropy source replaying an explicit word sequence, then wrapping.
pub struct ScriptedEntropy {
    words: Vec<u32>,
    next: usize,
}

impl ScriptedEntropy {
    /// Create a source that cycles through `words`.
    pub fn new(words: &[u32]) -> Self {
        Self {
            words: words.to_vec(),
            next: 0,
        }
    }

    /// How many words have been drawn so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl EntropySource for ScriptedEntropy {
    fn next_u32(&mut self) -> u32 {
        let word = self.words[self.next % self.words.len()];
        self.next += 1;
        word
    }
}

// ============================================================================
// SLEEP
// ============================================================================

/// Everything a [`HostSleepPort`] saw before entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SleepRecord {
    /// Armed timer duration in microseconds
    pub timer_us: Option<u64>,
    /// Armed EXT0 source as `(pin, level)`
    pub ext0: Option<(u8, bool)>,
    /// Armed EXT1 source as `(mask, trigger)`
    pub ext1: Option<(u64, Ext1Trigger)>,
    /// Touch source armed
    pub touch_armed: bool,
    /// Deep sleep was entered
    pub entered: bool,
}

/// Recording sleep port whose entry panics in place of the reset.
///
/// The record lives behind an [`Arc`] so it stays inspectable after the
/// controller consumed the port and the simulated entry unwound.
pub struct HostSleepPort {
    record: Arc<Mutex<SleepRecord>>,
}

impl HostSleepPort {
    /// Create a port with an empty record.
    pub fn new() -> Self {
        Self {
            record: Arc::new(Mutex::new(SleepRecord::default())),
        }
    }

    /// Handle for inspecting the record after (attempted) entry.
    pub fn record(&self) -> Arc<Mutex<SleepRecord>> {
        Arc::clone(&self.record)
    }
}

impl Default for HostSleepPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepPort for HostSleepPort {
    fn arm_timer_wakeup(&mut self, duration_us: u64) {
        self.record.lock().unwrap().timer_us = Some(duration_us);
    }

    fn arm_ext0_wakeup(&mut self, pin: u8, level: bool) {
        self.record.lock().unwrap().ext0 = Some((pin, level));
    }

    fn arm_ext1_wakeup(&mut self, mask: u64, trigger: Ext1Trigger) {
        self.record.lock().unwrap().ext1 = Some((mask, trigger));
    }

    fn arm_touch_wakeup(&mut self) {
        self.record.lock().unwrap().touch_armed = true;
    }

    fn enter_deep_sleep(&mut self) -> ! {
        self.record.lock().unwrap().entered = true;
        panic!("simulated deep sleep entry");
    }
}

/// Counting peripheral-shutdown collaborator.
#[derive(Debug, Default)]
pub struct HostPeripherals {
    /// Number of `deinit_all` calls observed
    pub deinit_calls: u32,
}

impl PeripheralShutdown for HostPeripherals {
    fn deinit_all(&mut self) {
        self.deinit_calls += 1;
    }
}

// ============================================================================
// CONSOLE
// ============================================================================

/// In-memory console transport.
///
/// Serves queued input bytes (an empty queue models a read timeout) and
/// collects everything written.
#[derive(Debug, Default)]
pub struct HostConsole {
    input: std::collections::VecDeque<u8>,
    /// Bytes written through the transport
    pub written: Vec<u8>,
    /// Number of flushes observed
    pub flush_count: u32,
}

impl HostConsole {
    /// Create a transport with no queued input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with `bytes` queued as input.
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut console = Self::default();
        console.push_input(bytes);
        console
    }

    /// Queue further input bytes.
    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes.iter().copied());
    }
}

impl ConsoleTransport for HostConsole {
    fn read_char(&mut self, _timeout_ms: u32) -> Option<u8> {
        self.input.pop_front()
    }

    fn write_bytes(&mut self, buf: &[u8]) {
        self.written.extend_from_slice(buf);
    }

    fn flush(&mut self) {
        self.flush_count += 1;
    }
}

// ============================================================================
// CAUSES AND SYSTEM
// ============================================================================

/// Cause registers frozen at construction, the way hardware registers are
/// frozen at boot.
#[derive(Debug, Clone, Copy)]
pub struct HostCauseRegisters {
    /// Raw reset cause code
    pub reset: u32,
    /// Raw wake cause code
    pub wake: u32,
}

impl CauseRegisters for HostCauseRegisters {
    fn reset_code(&self) -> u32 {
        self.reset
    }

    fn wake_code(&self) -> u32 {
        self.wake
    }
}

/// Fake system port with a mutable clock tree and canned identity.
#[derive(Debug)]
pub struct HostSystemPort {
    frequency_hz: u32,
    unique_id: [u8; 6],
    heap: HeapStats,
    /// Frequencies applied through `set_cpu_frequency`, in order
    pub set_calls: Vec<CpuFrequency>,
    /// Number of `idle` calls observed
    pub idle_calls: u32,
}

impl HostSystemPort {
    /// Create a port running at 160 MHz with a fixed identity.
    pub fn new() -> Self {
        Self {
            frequency_hz: 160_000_000,
            unique_id: [0x24, 0x0A, 0xC4, 0x00, 0x01, 0x02],
            heap: HeapStats {
                total_free: 4_100_000,
                external_free: 3_900_000,
            },
            set_calls: Vec::new(),
            idle_calls: 0,
        }
    }
}

impl Default for HostSystemPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemPort for HostSystemPort {
    fn cpu_frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    fn set_cpu_frequency(&mut self, freq: CpuFrequency) -> Result<()> {
        self.frequency_hz = freq.hz();
        self.set_calls.push(freq);
        Ok(())
    }

    fn restart(&mut self) -> ! {
        panic!("simulated restart");
    }

    fn unique_id(&self) -> [u8; 6] {
        self.unique_id
    }

    fn free_heap(&self) -> HeapStats {
        self.heap
    }

    fn idle(&mut self) {
        self.idle_calls += 1;
    }
}

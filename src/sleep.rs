//! Deep-sleep entry orchestration
//!
//! Deep sleep powers down the CPU and most peripheral domains; the only
//! way back is a full hardware reset fired by a pre-armed wake source.
//! The controller arms the configured sources, quiesces peripherals,
//! flushes the console, and hands the device to the hardware. Entry never
//! returns: the next thing that runs is boot.

use log::{debug, info};

use crate::console::ConsoleTransport;
use crate::types::Result;
use crate::wake::{Ext1Trigger, WakeConfig};

/// Console notice written before the lights go out.
pub const DEEP_SLEEP_NOTICE: &str = "entering deep sleep\r\n";

/// Platform deep-sleep operations.
pub trait SleepPort {
    /// Arm the RTC timer wake source.
    fn arm_timer_wakeup(&mut self, duration_us: u64);

    /// Arm the single-pin (EXT0) wake source at the given trigger level.
    fn arm_ext0_wakeup(&mut self, pin: u8, level: bool);

    /// Arm the multi-pin (EXT1) wake source for the masked pins.
    fn arm_ext1_wakeup(&mut self, mask: u64, trigger: Ext1Trigger);

    /// Arm the touch controller wake source.
    fn arm_touch_wakeup(&mut self);

    /// Enter deep sleep. Does not return; the device resets on wake.
    fn enter_deep_sleep(&mut self) -> !;
}

/// Peripheral teardown collaborator.
///
/// Called exactly once on the way into deep sleep. Implementations must
/// be idempotent and must not block indefinitely: deep sleep cuts power
/// to peripheral domains asynchronously, so anything left running holds
/// invalid state on wake.
pub trait PeripheralShutdown {
    /// Release and quiesce every peripheral owned by the runtime.
    fn deinit_all(&mut self);
}

/// Orchestrates the one-way transition into deep sleep.
///
/// Consuming `self` in [`enter_deep_sleep`] makes the state machine
/// explicit: a controller that has entered sleep no longer exists, so
/// re-entry cannot be expressed.
///
/// [`enter_deep_sleep`]: SleepController::enter_deep_sleep
pub struct SleepController<P: SleepPort> {
    port: P,
    config: WakeConfig,
}

impl<P: SleepPort> SleepController<P> {
    /// Create a controller over a validated wake configuration.
    pub fn new(port: P, config: WakeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { port, config })
    }

    /// The wake configuration this controller will arm.
    pub fn config(&self) -> &WakeConfig {
        &self.config
    }

    /// Arm wake sources, tear down peripherals, flush the console, and
    /// enter deep sleep.
    ///
    /// `timer_ms` overrides the registry's timer when `Some`; in either
    /// form a zero duration leaves the timer disarmed. Milliseconds are
    /// converted to the port's microsecond granularity here, at the
    /// boundary. The call requires exclusive use of the device: all other
    /// tasks must already be quiesced, and there is no abort path once
    /// invoked.
    pub fn enter_deep_sleep(
        mut self,
        timer_ms: Option<u64>,
        peripherals: &mut dyn PeripheralShutdown,
        console: &mut dyn ConsoleTransport,
    ) -> ! {
        let timer_ms = timer_ms.or(self.config.timer_ms);
        if let Some(ms) = timer_ms {
            if ms > 0 {
                // Saturation point is centuries past the RTC timer's range
                let duration_us = ms.saturating_mul(1000);
                debug!("Arming timer wake in {} us", duration_us);
                self.port.arm_timer_wakeup(duration_us);
            }
        }
        if let Some(pin) = self.config.ext0_pin {
            debug!(
                "Arming EXT0 wake on pin {} ({})",
                pin,
                if self.config.ext0_level { "high" } else { "low" }
            );
            self.port.arm_ext0_wakeup(pin, self.config.ext0_level);
        }
        if self.config.ext1_pins != 0 {
            debug!("Arming EXT1 wake on mask {:#x}", self.config.ext1_pins);
            self.port
                .arm_ext1_wakeup(self.config.ext1_pins, self.config.ext1_trigger);
        }
        if self.config.touch_enabled {
            debug!("Arming touch wake");
            self.port.arm_touch_wakeup();
        }

        info!("Entering deep sleep");
        console.write_bytes(DEEP_SLEEP_NOTICE.as_bytes());

        peripherals.deinit_all();
        console.flush();

        self.port.enter_deep_sleep()
    }
}

// ============================================================================
// ESP32 SLEEP PORT
// ============================================================================

/// ESP32 deep-sleep port over the RTC controller.
#[cfg(feature = "esp32")]
pub struct Esp32SleepPort;

#[cfg(feature = "esp32")]
impl SleepPort for Esp32SleepPort {
    fn arm_timer_wakeup(&mut self, _duration_us: u64) {
        // unsafe { esp_idf_sys::esp_sleep_enable_timer_wakeup(_duration_us) };
    }

    fn arm_ext0_wakeup(&mut self, _pin: u8, _level: bool) {
        // unsafe {
        //     esp_idf_sys::esp_sleep_enable_ext0_wakeup(_pin as i32, _level as i32)
        // };
    }

    fn arm_ext1_wakeup(&mut self, _mask: u64, _trigger: Ext1Trigger) {
        // let mode = match _trigger {
        //     Ext1Trigger::AnyHigh => esp_idf_sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ANY_HIGH,
        //     Ext1Trigger::AllLow => esp_idf_sys::esp_sleep_ext1_wakeup_mode_t_ESP_EXT1_WAKEUP_ALL_LOW,
        // };
        // unsafe { esp_idf_sys::esp_sleep_enable_ext1_wakeup(_mask, mode) };
    }

    fn arm_touch_wakeup(&mut self) {
        // unsafe { esp_idf_sys::esp_sleep_enable_touchpad_wakeup() };
    }

    fn enter_deep_sleep(&mut self) -> ! {
        // unsafe { esp_idf_sys::esp_deep_sleep_start() };
        // The SDK call does not return; spin in case the link-time stub is
        // used off-hardware.
        loop {
            core::hint::spin_loop();
        }
    }
}

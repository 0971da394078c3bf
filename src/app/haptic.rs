//! Vibration motor task

use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::Output;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Timer;
use watch_sense::VibratePattern;

/// Signal carrying the next vibration request; a new one replaces a running one
static HAPTIC: Signal<CriticalSectionRawMutex, VibratePattern> = Signal::new();

/// Requests a vibration pattern
pub fn send_haptic_command(pattern: VibratePattern) {
    HAPTIC.signal(pattern);
}

#[embassy_executor::task]
pub async fn haptic_task(mut motor: Output<'static>) {
    info!("Haptic task initialized successfully");

    let mut next = HAPTIC.wait().await;
    loop {
        motor.set_low();
        if !next.enable {
            next = HAPTIC.wait().await;
            continue;
        }

        info!(
            "Vibrating {}x {} ms on / {} ms off",
            next.cycles, next.on_ms, next.off_ms
        );
        match select(HAPTIC.wait(), run_pattern(&mut motor, next)).await {
            Either::First(replacement) => next = replacement,
            Either::Second(()) => {
                motor.set_low();
                next = HAPTIC.wait().await;
            }
        }
    }
}

/// Drives the motor through all cycles of `pattern`
async fn run_pattern(motor: &mut Output<'static>, pattern: VibratePattern) {
    for _ in 0..pattern.cycles {
        motor.set_high();
        Timer::after_millis(u64::from(pattern.on_ms)).await;
        motor.set_low();
        Timer::after_millis(u64::from(pattern.off_ms)).await;
    }
}

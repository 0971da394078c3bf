//! Charger detection from the VBUS pin

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::info;
use embassy_rp::gpio::Input;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Timer;

use crate::app::event::{Event, send_event};

/// Whether external power is present, read by the low battery monitor
static POWER_GOOD: AtomicBool = AtomicBool::new(false);

/// Raised on every debounced power state change
pub static POWER_CHANGED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Current power state
pub fn power_good() -> bool {
    POWER_GOOD.load(Ordering::Relaxed)
}

#[embassy_executor::task]
pub async fn vbus_monitor_task(mut vbus: Input<'static>) {
    info!("VBUS monitor task initialized successfully");

    Timer::after_millis(100).await; // Initial debounce delay

    loop {
        let is_charging = vbus.is_high();
        POWER_GOOD.store(is_charging, Ordering::Relaxed);
        POWER_CHANGED.signal(is_charging);
        send_event(Event::BatteryCharging(is_charging)).await;

        vbus.wait_for_any_edge().await;

        // Small delay to debounce
        Timer::after_millis(200).await;
    }
}

//! Periodic low battery check

use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_time::Timer;
use watch_sense::{
    BatteryMonitor, BatteryThresholds,
    config::{BATTERY_DEBUG, LOW_BATTERY_CHECK_PERIOD},
};

use crate::app::{
    event::{Event, send_event},
    nv::RamThresholdStore,
    sense::Controller,
    vbus::{POWER_CHANGED, power_good},
};

#[embassy_executor::task]
pub async fn low_battery_task(adc: &'static Controller, mut store: RamThresholdStore) {
    let mut monitor = BatteryMonitor::new(BatteryThresholds::load_or_default(&mut store));
    monitor.set_debug(BATTERY_DEBUG);
    let thresholds = monitor.thresholds();
    info!(
        "Low battery monitor started: warning {} mV, cutoff {} mV",
        thresholds.warning_mv, thresholds.cutoff_mv
    );

    loop {
        // a power change is checked right away so charging re-arms promptly
        if let Either::First(charging) = select(POWER_CHANGED.wait(), Timer::after(LOW_BATTERY_CHECK_PERIOD)).await {
            info!("Power state changed, charging: {}", charging);
        }

        for action in monitor.check(adc.readings(), power_good()) {
            send_event(Event::LowBattery(action)).await;
        }
    }
}

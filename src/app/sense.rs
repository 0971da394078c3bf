//! Sense channel measurement tasks

use defmt::{Format, info};
use embassy_futures::select::{Either, select};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    signal::Signal,
};
use embassy_time::Timer;
use watch_sense::{
    AdcController, AdcResult, Uncalibrated,
    config::{BATTERY_SENSE_PERIOD, LIGHT_SENSE_PERIOD, SAMPLE_COUNT},
};

use crate::app::{
    event::{Event, send_event},
    rp_adc::RpAdc,
};

/// The controller shared by every task that needs a conversion
pub type Controller = AdcController<'static, CriticalSectionRawMutex, RpAdc, Uncalibrated>;

/// Signal for requesting a battery measurement outside the regular period
pub static BATTERY_SENSE: Signal<CriticalSectionRawMutex, SenseCommand> = Signal::new();

/// Requests a battery measurement
pub fn send_sense_command(command: SenseCommand) {
    BATTERY_SENSE.signal(command);
}

/// Waits for the next measurement request
async fn wait_for_sense_command() -> SenseCommand {
    BATTERY_SENSE.wait().await
}

/// Command to trigger battery measurements
#[derive(PartialEq, Eq, Format)]
pub enum SenseCommand {
    /// Refill the whole rolling average, e.g. after the charger was unplugged
    RefreshAverage,
}

/// Reports a failed cycle to the orchestrator
async fn report(result: AdcResult<u16>) {
    if let Err(error) = result {
        send_event(Event::SenseFailed(error)).await;
    }
}

#[embassy_executor::task]
pub async fn hardware_config_task(adc: &'static Controller) {
    let result = adc.hardware_config_cycle().await;
    info!("Hardware configuration reading: {}", adc.readings().hardware_configuration());
    report(result).await;
}

/// Runs a burst of battery cycles that refills every slot of the average
async fn fill_battery_average(adc: &Controller) {
    for _ in 0..SAMPLE_COUNT {
        report(adc.battery_sense_cycle().await).await;
        Timer::after_millis(20).await; // small delay between measurements
    }
}

#[embassy_executor::task]
pub async fn battery_sense_task(adc: &'static Controller) {
    info!("Battery sense task initialized successfully");

    // the low battery monitor waits for this first reading
    fill_battery_average(adc).await;

    loop {
        match select(wait_for_sense_command(), Timer::after(BATTERY_SENSE_PERIOD)).await {
            Either::First(command) => {
                info!("Battery sense command received: {}", command);
                // the average still lags behind the new power state
                fill_battery_average(adc).await;
            }
            Either::Second(()) => {
                report(adc.battery_sense_cycle().await).await;
            }
        }

        info!(
            "Battery: {} mV, average {} mV",
            adc.readings().battery_sense(),
            adc.readings().battery_sense_average()
        );
    }
}

#[embassy_executor::task]
pub async fn light_sense_task(adc: &'static Controller) {
    info!("Light sense task initialized successfully");

    loop {
        report(adc.light_sense_cycle().await).await;
        Timer::after(LIGHT_SENSE_PERIOD).await;
    }
}

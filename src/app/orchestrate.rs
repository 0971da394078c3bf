//! The main orchestrator task for the system

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, warn};
use watch_sense::{Alert, LowBatteryAction, Target};

use crate::app::{
    event::{Event, receive_event},
    haptic::send_haptic_command,
    sense::{SenseCommand, send_sense_command},
};

/// Whether the radio may be used; cleared at the battery cutoff
static RADIO_ENABLED: AtomicBool = AtomicBool::new(true);

/// Main coordination task that implements the system's event loop
#[embassy_executor::task]
pub async fn orchestrate_task() {
    loop {
        let event = receive_event().await;
        process_event(event);
    }
}

/// Processes the received event and hands it to the subsystem that owns it
fn process_event(event: Event) {
    match event {
        Event::BatteryCharging(charging) => {
            info!("Charging: {}", charging);
            if !charging {
                // the average still holds samples taken on the charger
                send_sense_command(SenseCommand::RefreshAverage);
            }
        }
        Event::LowBattery(LowBatteryAction::Notify { target, alert }) => notify(target, alert),
        Event::LowBattery(LowBatteryAction::Vibrate(pattern)) => send_haptic_command(pattern),
        Event::LowBattery(LowBatteryAction::ResumeNormalOperation) => {
            info!("Radio back on");
            RADIO_ENABLED.store(true, Ordering::Relaxed);
        }
        Event::SenseFailed(error) => warn!("Sense cycle failed: {}", error),
    }
}

/// Delivers a low battery alert to the host link or the display
fn notify(target: Target, alert: Alert) {
    match (target, alert) {
        (Target::Host, Alert::CutoffReached(mv)) => {
            // the host hears about the cutoff before the link goes down
            if RADIO_ENABLED.swap(false, Ordering::Relaxed) {
                info!("Host: battery cutoff at {} mV, radio off", mv);
            }
        }
        (Target::Host, Alert::WarningReached(mv)) => {
            if RADIO_ENABLED.load(Ordering::Relaxed) {
                info!("Host: low battery warning at {} mV", mv);
            } else {
                warn!("Radio off, low battery warning at {} mV not sent to host", mv);
            }
        }
        (Target::Display, alert) => info!("Display: {}", alert),
    }
}

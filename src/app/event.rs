//! Events and system channel for sending and receiving events

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use watch_sense::{AdcError, LowBatteryAction};

/// System event channel for sending and receiving events
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Event, EVENT_CHANNEL_CAPACITY> = Channel::new();
/// The capacity of the event channel
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Sends an event to the system channel
pub async fn send_event(event: Event) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event from the system channel
pub async fn receive_event() -> Event {
    EVENT_CHANNEL.receiver().receive().await
}

/// The event type used in the system
#[derive(Debug, Clone, Copy)]
pub enum Event {
    /// External power state changed (true = charging / power good)
    BatteryCharging(bool),
    /// Something the low battery monitor wants done
    LowBattery(LowBatteryAction),
    /// A conversion cycle failed
    SenseFailed(AdcError),
}

//! Latest values of every channel, readable from any task without locking

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use crate::channel::Channel;

/// Instant and averaged value of one channel
#[derive(Debug)]
struct Slot {
    /// Value of the most recent conversion
    instant: AtomicU16,
    /// Rolling average including the most recent conversion
    average: AtomicU16,
    /// Set once the first conversion was published
    published: AtomicBool,
}

impl Slot {
    /// Creates a slot reading zero
    const fn new() -> Self {
        Self {
            instant: AtomicU16::new(0),
            average: AtomicU16::new(0),
            published: AtomicBool::new(false),
        }
    }
}

/// Published channel values.
///
/// Each slot has exactly one writer, the conversion cycle of its channel,
/// so readers may see a value that is one cycle old but never a torn one.
#[derive(Debug)]
pub struct ReadingStore {
    /// Hardware revision divider, single shot
    hardware_config: Slot,
    /// Battery voltage in millivolts
    battery: Slot,
    /// Light sensor voltage in tenths of a millivolt
    light: Slot,
}

impl ReadingStore {
    /// Creates a store with every reading at zero
    pub const fn new() -> Self {
        Self {
            hardware_config: Slot::new(),
            battery: Slot::new(),
            light: Slot::new(),
        }
    }

    /// Slot belonging to `channel`
    const fn slot(&self, channel: Channel) -> &Slot {
        match channel {
            Channel::HardwareConfig => &self.hardware_config,
            Channel::BatterySense => &self.battery,
            Channel::LightSense => &self.light,
        }
    }

    /// Publishes the outcome of a conversion
    pub(crate) fn publish(&self, channel: Channel, instant: u16, average: u16) {
        let slot = self.slot(channel);
        slot.instant.store(instant, Ordering::Relaxed);
        slot.average.store(average, Ordering::Relaxed);
        slot.published.store(true, Ordering::Release);
    }

    /// Whether `channel` has published at least one conversion.
    ///
    /// Until then its values read zero and carry no meaning.
    pub fn has_sample(&self, channel: Channel) -> bool {
        self.slot(channel).published.load(Ordering::Acquire)
    }

    /// Most recent value of `channel`
    pub fn instant(&self, channel: Channel) -> u16 {
        self.slot(channel).instant.load(Ordering::Relaxed)
    }

    /// Rolling average of `channel`, or its latest value while warming up
    pub fn average(&self, channel: Channel) -> u16 {
        self.slot(channel).average.load(Ordering::Relaxed)
    }

    /// Latest battery voltage in millivolts
    pub fn battery_sense(&self) -> u16 {
        self.instant(Channel::BatterySense)
    }

    /// Averaged battery voltage in millivolts
    pub fn battery_sense_average(&self) -> u16 {
        self.average(Channel::BatterySense)
    }

    /// Latest light sensor reading
    pub fn light_sense(&self) -> u16 {
        self.instant(Channel::LightSense)
    }

    /// Averaged light sensor reading
    pub fn light_sense_average(&self) -> u16 {
        self.average(Channel::LightSense)
    }

    /// Hardware configuration reading taken at boot
    pub fn hardware_configuration(&self) -> u16 {
        self.instant(Channel::HardwareConfig)
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_do_not_share_slots() {
        let store = ReadingStore::new();
        store.publish(Channel::BatterySense, 3712, 3700);
        store.publish(Channel::LightSense, 91, 85);
        store.publish(Channel::HardwareConfig, 1200, 1200);

        assert_eq!(store.battery_sense(), 3712);
        assert_eq!(store.battery_sense_average(), 3700);
        assert_eq!(store.light_sense(), 91);
        assert_eq!(store.light_sense_average(), 85);
        assert_eq!(store.hardware_configuration(), 1200);
    }

    #[test]
    fn nothing_published_until_the_first_conversion() {
        let store = ReadingStore::new();
        assert!(!store.has_sample(Channel::BatterySense));

        store.publish(Channel::LightSense, 91, 91);
        assert!(store.has_sample(Channel::LightSense));
        assert!(!store.has_sample(Channel::BatterySense));
        assert_eq!(store.battery_sense_average(), 0);

        store.publish(Channel::BatterySense, 3712, 3712);
        assert!(store.has_sample(Channel::BatterySense));
    }
}

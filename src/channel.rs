//! The three logical channels multiplexed onto the converter

use embassy_time::Duration;

use crate::config::{
    ADC_FULL_SCALE, ADC_STEPS, BATTERY_DIVIDER_HIGH_OHMS, BATTERY_DIVIDER_LOW_OHMS, LIGHT_SCALE,
    LIGHT_SETTLE_DELAY, REFERENCE_MV,
};

/// A logical sense channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Voltage divider populated differently per board revision
    HardwareConfig,
    /// Battery voltage behind a resistor divider
    BatterySense,
    /// Ambient light sensor
    LightSense,
}

impl Channel {
    /// All channels, in input order
    #[cfg(test)]
    pub(crate) const ALL: [Self; 3] = [Self::HardwareConfig, Self::BatterySense, Self::LightSense];

    /// Short name for log output
    pub const fn name(self) -> &'static str {
        match self {
            Self::HardwareConfig => "hw-config",
            Self::BatterySense => "battery",
            Self::LightSense => "light",
        }
    }

    /// Time the sense circuit needs after power up before it can be sampled
    pub const fn settle_delay(self) -> Option<Duration> {
        match self {
            Self::LightSense => Some(LIGHT_SETTLE_DELAY),
            Self::HardwareConfig | Self::BatterySense => None,
        }
    }

    /// Converts raw counts to this channel's unit
    pub fn convert(self, counts: u16) -> u16 {
        match self {
            Self::BatterySense => counts_to_battery_mv(counts),
            Self::HardwareConfig | Self::LightSense => counts_to_voltage(counts),
        }
    }
}

impl core::fmt::Display for Channel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Battery voltage in millivolts from counts, undoing the divider (truncates)
pub fn counts_to_battery_mv(counts: u16) -> u16 {
    let numerator = u64::from(counts)
        * u64::from(BATTERY_DIVIDER_LOW_OHMS + BATTERY_DIVIDER_HIGH_OHMS)
        * u64::from(REFERENCE_MV);
    let denominator = u64::from(ADC_FULL_SCALE) * u64::from(BATTERY_DIVIDER_LOW_OHMS);
    u16::try_from(numerator / denominator).unwrap_or(u16::MAX)
}

/// Input voltage in tenths of a millivolt from counts (truncates)
pub fn counts_to_voltage(counts: u16) -> u16 {
    let numerator = u64::from(counts) * u64::from(REFERENCE_MV * LIGHT_SCALE);
    u16::try_from(numerator / u64::from(ADC_STEPS)).unwrap_or(u16::MAX)
}

//! Device constants for the sense channels, the converter and the low battery policy

use embassy_time::Duration;

use crate::battery::VibratePattern;

/// Number of samples in each rolling average
pub const SAMPLE_COUNT: usize = 10;

/// Full scale of the 12 bit converter, used by the battery divider formula
pub const ADC_FULL_SCALE: u32 = 4095;

/// Number of converter steps, used by the light and hardware configuration formula
pub const ADC_STEPS: u32 = 4096;

/// Reference voltage in millivolts
pub const REFERENCE_MV: u32 = 2500;

/// Lower resistor of the battery divider in ohms
pub const BATTERY_DIVIDER_LOW_OHMS: u32 = 24_300;

/// Upper resistor of the battery divider in ohms
pub const BATTERY_DIVIDER_HIGH_OHMS: u32 = 38_300;

/// Light and hardware configuration readings are in units of 0.1 mV
pub const LIGHT_SCALE: u32 = 10;

/// Light sensor wake up time in the dark
pub const LIGHT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Longest a single conversion may keep the converter busy
pub const CONVERSION_TIMEOUT: Duration = Duration::from_millis(50);

/// Default low battery warning level in millivolts
pub const DEFAULT_WARNING_MV: u16 = 3500;

/// Default level in millivolts below which the radio is switched off
pub const DEFAULT_CUTOFF_MV: u16 = 3300;

/// Externally supplied threshold levels are coarse, in units of 100 mV
pub const THRESHOLD_SCALE: u16 = 100;

/// Vibration sent to the wearer when the cutoff level is reached
pub const CUTOFF_VIBRATION: VibratePattern = VibratePattern {
    enable: true,
    on_ms: 256,
    off_ms: 256,
    cycles: 5,
};

/// Vibration sent to the wearer when the warning level is reached
pub const WARNING_VIBRATION: VibratePattern = VibratePattern {
    enable: true,
    on_ms: 512,
    off_ms: 512,
    cycles: 5,
};

/// How often the battery channel is sampled when nobody asks for it
pub const BATTERY_SENSE_PERIOD: Duration = Duration::from_secs(30);

/// How often the light channel is sampled
pub const LIGHT_SENSE_PERIOD: Duration = Duration::from_secs(10);

/// How often the low battery monitor evaluates the battery average
pub const LOW_BATTERY_CHECK_PERIOD: Duration = Duration::from_secs(60);

/// Log instant and average battery voltage on every low battery check
pub const BATTERY_DEBUG: bool = false;

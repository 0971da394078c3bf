//! Errors reported by a conversion cycle

use thiserror_no_std::Error;

use crate::channel::Channel;

/// Result type for conversion cycles
pub type AdcResult<T> = Result<T, AdcError>;

/// Failures of a conversion cycle. The converter is always powered down and
/// released before one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcError {
    /// The busy indicator did not clear within the conversion timeout
    #[error("conversion on {channel} timed out")]
    ConversionTimeout {
        /// Channel whose conversion never finished
        channel: Channel,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for AdcError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::ConversionTimeout { channel } => {
                defmt::write!(fmt, "conversion on {} timed out", channel.name());
            }
        }
    }
}

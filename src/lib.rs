//! Sampling core for the wearable's single ADC.
//!
//! One converter is shared by three sense channels: the board revision
//! divider, the battery divider and the ambient light sensor. Conversion
//! cycles for all of them go through one [`gate::HardwareGate`], publish into
//! a lock-free [`readings::ReadingStore`], and the battery average drives the
//! [`battery::BatteryMonitor`] low battery alerts.
//!
//! The register level driver, calibration data and threshold storage are
//! supplied through the traits in [`hardware`] and [`battery`], so everything
//! here runs on the host as well as on the watch.
//!
//! # Features
//!
//! - `defmt`: log through defmt
//! - `log`: log through the `log` facade
//! - `rp2350`: build the firmware binary

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod averaging;
pub mod battery;
pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod hardware;
pub mod readings;

pub use battery::{Alert, BatteryMonitor, BatteryThresholds, LowBatteryAction, Target, ThresholdStore, VibratePattern};
pub use channel::Channel;
pub use controller::AdcController;
pub use error::{AdcError, AdcResult};
pub use hardware::{AdcHardware, Calibration, SleepInhibitor, Uncalibrated};
pub use readings::ReadingStore;

//! Firmware tasks and the RP2350 converter driver

pub mod event;
pub mod haptic;
pub mod low_battery;
pub mod nv;
pub mod orchestrate;
pub mod rp_adc;
pub mod sense;
pub mod vbus;

#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::{
    adc::{Adc, Channel as AdcInput, Config as AdcConfig},
    block::ImageDef,
    config::Config,
    gpio::{Input, Level, Output, Pull},
};
use panic_probe as _;
use static_cell::StaticCell;
use watch_sense::{AdcController, SleepInhibitor, Uncalibrated};

mod app;

use app::{haptic, low_battery, nv::RamThresholdStore, orchestrate, rp_adc::RpAdc, sense, vbus};

// Firmware image type for bootloader
#[unsafe(link_section = ".start_block")]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Low power mode bookkeeping shared by every task
static SLEEP: SleepInhibitor = SleepInhibitor::new();

/// The one converter controller
static ADC: StaticCell<sense::Controller> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Converter and sense circuits, all in Channel order:
    // hardware config on GPIO26, battery on GPIO29, light on GPIO27
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let inputs = [
        AdcInput::new_pin(p.PIN_26, Pull::None),
        AdcInput::new_pin(p.PIN_29, Pull::None),
        AdcInput::new_pin(p.PIN_27, Pull::None),
    ];
    let enables = [
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
    ];
    let controller: &'static sense::Controller =
        ADC.init(AdcController::new(RpAdc::new(adc, inputs, enables), Uncalibrated, &SLEEP));

    // Initialize VBUS monitoring
    let vbus = Input::new(p.PIN_24, Pull::None);

    // Vibration motor
    let motor = Output::new(p.PIN_5, Level::Low);

    info!("Starting sense tasks");

    spawner.spawn(orchestrate::orchestrate_task()).unwrap();
    spawner.spawn(vbus::vbus_monitor_task(vbus)).unwrap();
    spawner.spawn(haptic::haptic_task(motor)).unwrap();
    spawner.spawn(sense::hardware_config_task(controller)).unwrap();
    spawner.spawn(sense::battery_sense_task(controller)).unwrap();
    spawner.spawn(sense::light_sense_task(controller)).unwrap();
    spawner
        .spawn(low_battery::low_battery_task(controller, RamThresholdStore::default()))
        .unwrap();
}

//! Register level converter access on the RP2350

use embassy_rp::{
    adc::{Adc, Blocking, Channel as AdcInput},
    gpio::Output,
    pac,
};
use watch_sense::{AdcHardware, Channel};

/// The RP2350 ADC plus the supply switches of the three sense circuits.
///
/// The embassy driver is kept alive so the block stays clocked and out of
/// reset; conversions themselves are started and polled through the PAC.
pub struct RpAdc {
    /// Keeps the ADC block powered
    _adc: Adc<'static, Blocking>,
    /// Analog inputs in `Channel` order, kept so the pads stay analog
    _inputs: [AdcInput<'static>; 3],
    /// Sense circuit supplies in `Channel` order
    enables: [Output<'static>; 3],
}

impl RpAdc {
    /// Takes the converter, the analog inputs and the sense supply switches,
    /// all in `Channel` order
    pub fn new(adc: Adc<'static, Blocking>, inputs: [AdcInput<'static>; 3], enables: [Output<'static>; 3]) -> Self {
        Self {
            _adc: adc,
            _inputs: inputs,
            enables,
        }
    }

    /// Input multiplexer selection for `channel`
    const fn ainsel(channel: Channel) -> u8 {
        match channel {
            Channel::HardwareConfig => 0, // GPIO26
            Channel::LightSense => 1,     // GPIO27
            Channel::BatterySense => 3,   // GPIO29
        }
    }
}

impl AdcHardware for RpAdc {
    fn enable_sense(&mut self, channel: Channel) {
        self.enables[channel as usize].set_high();
    }

    fn disable_sense(&mut self, channel: Channel) {
        self.enables[channel as usize].set_low();
    }

    // no switchable reference on this part, the ADC runs from ADC_AVDD
    fn enable_reference(&mut self) {}

    fn disable_reference(&mut self) {}

    fn start_conversion(&mut self, channel: Channel) {
        let adc = pac::ADC;
        adc.cs().modify(|w| w.set_en(true));
        // the converter needs a few cycles after enable before it takes a start
        while !adc.cs().read().ready() {}
        adc.cs().modify(|w| {
            w.set_ainsel(Self::ainsel(channel));
            w.set_start_once(true);
        });
    }

    fn is_busy(&self) -> bool {
        !pac::ADC.cs().read().ready()
    }

    fn read_counts(&mut self, _channel: Channel) -> u16 {
        pac::ADC.result().read().result()
    }

    fn disable_converter(&mut self) {
        pac::ADC.cs().modify(|w| w.set_en(false));
    }
}

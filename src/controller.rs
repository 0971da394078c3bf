//! Conversion cycles: power up, settle, convert, decode, power down.
//!
//! Each cycle holds the hardware gate from the moment the channel is powered
//! until it is powered down again. Power down happens in a drop guard, so it
//! runs on the normal path, on a conversion timeout, and when the caller drops
//! the cycle future halfway through.

use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{Timer, with_timeout};

use crate::{
    averaging::AveragingBuffer,
    channel::Channel,
    config::{CONVERSION_TIMEOUT, SAMPLE_COUNT},
    error::{AdcError, AdcResult},
    gate::{GateGuard, HardwareGate},
    hardware::{AdcHardware, Calibration, SleepInhibitor},
    readings::ReadingStore,
};

/// Where a conversion cycle currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CyclePhase {
    /// Gate held, nothing powered yet
    Idle,
    /// Sense circuit and reference are on
    PoweredUp,
    /// Conversion started, waiting for the busy flag to clear
    Converting,
    /// Result read and published
    Settled,
}

/// Everything only a gate holder may touch
pub struct ConverterState<H> {
    /// Converter driver
    hardware: H,
    /// Rolling battery samples
    battery: AveragingBuffer<SAMPLE_COUNT>,
    /// Rolling light samples
    light: AveragingBuffer<SAMPLE_COUNT>,
}

impl<H> ConverterState<H> {
    /// Wraps a driver with empty sample buffers
    const fn new(hardware: H) -> Self {
        Self {
            hardware,
            battery: AveragingBuffer::new(),
            light: AveragingBuffer::new(),
        }
    }

    /// Stores `value` for `channel` and returns the resulting average
    fn record(&mut self, channel: Channel, value: u16) -> u16 {
        let buffer = match channel {
            Channel::BatterySense => &mut self.battery,
            Channel::LightSense => &mut self.light,
            Channel::HardwareConfig => return value,
        };
        buffer.push(value);
        buffer.average()
    }
}

/// Gate ownership for one cycle; powers the channel down before releasing
struct ActiveCycle<'a, M: RawMutex, H: AdcHardware> {
    /// Channel being converted
    channel: Channel,
    /// Progress, only used to report abandoned cycles
    phase: CyclePhase,
    /// Held for the whole cycle
    state: GateGuard<'a, M, ConverterState<H>>,
}

impl<M: RawMutex, H: AdcHardware> ActiveCycle<'_, M, H> {
    /// Moves to the next phase
    fn enter(&mut self, phase: CyclePhase) {
        debug!("{} cycle: {:?} -> {:?}", self.channel.name(), self.phase, phase);
        self.phase = phase;
    }
}

impl<M: RawMutex, H: AdcHardware> Drop for ActiveCycle<'_, M, H> {
    fn drop(&mut self) {
        if self.phase != CyclePhase::Settled {
            warn!("{} cycle ended early in {:?}", self.channel.name(), self.phase);
        }
        let hardware = &mut self.state.hardware;
        hardware.disable_sense(self.channel);
        hardware.disable_reference();
        hardware.disable_converter();
        // the gate guard is dropped right after this, releasing the converter
    }
}

/// Serialises the three sense channels onto one converter
pub struct AdcController<'a, M: RawMutex, H, C> {
    /// Exclusive access to the converter and the sample buffers
    gate: HardwareGate<M, ConverterState<H>>,
    /// Published readings
    readings: ReadingStore,
    /// Battery calibration source
    calibration: C,
    /// Low power mode bookkeeping shared with the rest of the firmware
    sleep: &'a SleepInhibitor,
}

impl<'a, M, H, C> AdcController<'a, M, H, C>
where
    M: RawMutex,
    H: AdcHardware,
    C: Calibration,
{
    /// Creates a controller around an idle converter
    pub const fn new(hardware: H, calibration: C, sleep: &'a SleepInhibitor) -> Self {
        Self {
            gate: HardwareGate::new(ConverterState::new(hardware)),
            readings: ReadingStore::new(),
            calibration,
            sleep,
        }
    }

    /// Published readings of all channels
    pub const fn readings(&self) -> &ReadingStore {
        &self.readings
    }

    /// Reads the board revision divider once
    pub async fn hardware_config_cycle(&self) -> AdcResult<u16> {
        self.run_cycle(Channel::HardwareConfig).await
    }

    /// Samples the battery voltage
    pub async fn battery_sense_cycle(&self) -> AdcResult<u16> {
        self.run_cycle(Channel::BatterySense).await
    }

    /// Samples the ambient light sensor
    pub async fn light_sense_cycle(&self) -> AdcResult<u16> {
        self.run_cycle(Channel::LightSense).await
    }

    /// Runs one full conversion on `channel` and returns the decoded value
    pub async fn run_cycle(&self, channel: Channel) -> AdcResult<u16> {
        let mut hold = self.sleep.hold();
        let mut cycle = ActiveCycle {
            channel,
            phase: CyclePhase::Idle,
            state: self.gate.acquire(&mut hold).await,
        };

        cycle.state.hardware.enable_sense(channel);
        cycle.state.hardware.enable_reference();
        cycle.enter(CyclePhase::PoweredUp);

        // the hold stays asserted, the sensor needs its supply running
        if let Some(delay) = channel.settle_delay() {
            Timer::after(delay).await;
        }

        cycle.state.hardware.start_conversion(channel);
        cycle.enter(CyclePhase::Converting);

        if with_timeout(CONVERSION_TIMEOUT, wait_while_busy(&cycle.state.hardware))
            .await
            .is_err()
        {
            error!(
                "{} conversion did not finish in {} ms",
                channel.name(),
                CONVERSION_TIMEOUT.as_millis()
            );
            return Err(AdcError::ConversionTimeout { channel });
        }

        let counts = cycle.state.hardware.read_counts(channel);
        let value = self.calibrate(channel, channel.convert(counts));
        let average = cycle.state.record(channel, value);
        self.readings.publish(channel, value, average);
        cycle.enter(CyclePhase::Settled);

        debug!("{}: {} counts -> {} (avg {})", channel.name(), counts, value, average);
        Ok(value)
    }

    /// Applies the battery calibration offset when the calibration is valid
    fn calibrate(&self, channel: Channel, value: u16) -> u16 {
        if channel == Channel::BatterySense && self.calibration.is_valid() {
            value.saturating_add_signed(self.calibration.battery_offset())
        } else {
            value
        }
    }
}

/// Yields to other tasks until the converter clears its busy flag
async fn wait_while_busy<H: AdcHardware>(hardware: &H) {
    while hardware.is_busy() {
        yield_now().await;
    }
}

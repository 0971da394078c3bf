//! Low battery policy: a warning level and a radio cutoff level, each
//! announced once per discharge and re-armed by charging.

use heapless::Vec;

use crate::{
    config::{CUTOFF_VIBRATION, DEFAULT_CUTOFF_MV, DEFAULT_WARNING_MV, THRESHOLD_SCALE, WARNING_VIBRATION},
    channel::Channel,
    readings::ReadingStore,
};

/// Battery levels in millivolts that trigger the alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryThresholds {
    /// Below this the wearer is warned
    pub warning_mv: u16,
    /// Below this the radio is switched off
    pub cutoff_mv: u16,
}

impl BatteryThresholds {
    /// Levels used when nothing has been stored yet
    pub const DEFAULT: Self = Self {
        warning_mv: DEFAULT_WARNING_MV,
        cutoff_mv: DEFAULT_CUTOFF_MV,
    };

    /// Builds thresholds from the coarse levels sent by the host, in units of 100 mV
    pub const fn from_coarse(warning: u8, cutoff: u8) -> Self {
        Self {
            warning_mv: warning as u16 * THRESHOLD_SCALE,
            cutoff_mv: cutoff as u16 * THRESHOLD_SCALE,
        }
    }

    /// Loads the stored thresholds, falling back to the defaults
    pub fn load_or_default<S: ThresholdStore>(store: &mut S) -> Self {
        store.load().unwrap_or_else(|| {
            info!("no stored battery thresholds, using defaults");
            Self::DEFAULT
        })
    }
}

impl Default for BatteryThresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Non-volatile storage for the thresholds
pub trait ThresholdStore {
    /// Stored thresholds, if any were ever written
    fn load(&mut self) -> Option<BatteryThresholds>;

    /// Writes the thresholds
    fn store(&mut self, thresholds: &BatteryThresholds);
}

/// A vibration request for the haptic motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VibratePattern {
    /// Start (true) or stop (false) the motor
    pub enable: bool,
    /// Motor on time per cycle
    pub on_ms: u16,
    /// Motor off time per cycle
    pub off_ms: u16,
    /// Number of on/off cycles
    pub cycles: u8,
}

/// Battery alert carrying the average that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alert {
    /// The cutoff level was crossed, the radio should be switched off
    CutoffReached(u16),
    /// The warning level was crossed
    WarningReached(u16),
}

/// Who an alert is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    /// Status reporting towards the connected host
    Host,
    /// The on-watch display
    Display,
}

/// Side effect requested by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowBatteryAction {
    /// Deliver an alert
    Notify {
        /// Recipient
        target: Target,
        /// What happened
        alert: Alert,
    },
    /// Buzz the wearer
    Vibrate(VibratePattern),
    /// Charging after a cutoff, bring the radio back
    ResumeNormalOperation,
}

/// Actions of a single evaluation; two alerts with three actions each at most
pub type Actions = Vec<LowBatteryAction, 6>;

/// Two-level, edge triggered low battery state machine
#[derive(Debug, Clone)]
pub struct BatteryMonitor {
    /// Active thresholds
    thresholds: BatteryThresholds,
    /// Warning already announced in this discharge
    warning_sent: bool,
    /// Cutoff already announced in this discharge
    cutoff_sent: bool,
    /// Log every evaluation
    debug: bool,
}

impl BatteryMonitor {
    /// Creates a monitor with both alerts armed
    pub const fn new(thresholds: BatteryThresholds) -> Self {
        Self {
            thresholds,
            warning_sent: false,
            cutoff_sent: false,
            debug: false,
        }
    }

    /// Active thresholds
    pub const fn thresholds(&self) -> BatteryThresholds {
        self.thresholds
    }

    /// Replaces the thresholds; the latches are left as they are
    pub fn set_thresholds(&mut self, thresholds: BatteryThresholds) {
        if thresholds.cutoff_mv > thresholds.warning_mv {
            warn!(
                "cutoff level {} mV is above warning level {} mV",
                thresholds.cutoff_mv,
                thresholds.warning_mv
            );
        }
        self.thresholds = thresholds;
    }

    /// Sets new coarse levels and writes them to `store` right away
    pub fn set_battery_levels<S: ThresholdStore>(&mut self, store: &mut S, warning: u8, cutoff: u8) {
        let thresholds = BatteryThresholds::from_coarse(warning, cutoff);
        self.set_thresholds(thresholds);
        store.store(&thresholds);
        info!(
            "battery levels set: warning {} mV, cutoff {} mV",
            thresholds.warning_mv,
            thresholds.cutoff_mv
        );
    }

    /// Logs instant and average on every evaluation
    pub const fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Whether the warning was announced in the current discharge
    pub const fn warning_sent(&self) -> bool {
        self.warning_sent
    }

    /// Whether the cutoff was announced in the current discharge
    pub const fn cutoff_sent(&self) -> bool {
        self.cutoff_sent
    }

    /// Evaluates the latest published battery readings.
    ///
    /// Nothing is evaluated before the battery channel published its first
    /// conversion, the store reads zero until then.
    pub fn check(&mut self, readings: &ReadingStore, power_good: bool) -> Actions {
        if !readings.has_sample(Channel::BatterySense) {
            debug!("no battery reading yet, low battery check skipped");
            return Actions::new();
        }

        self.evaluate(
            readings.battery_sense(),
            readings.battery_sense_average(),
            power_good,
        )
    }

    /// Evaluates the battery average once.
    ///
    /// While power is good both alerts are re-armed and, if the radio had
    /// been cut off, a single resume is requested. Otherwise the cutoff is
    /// checked before the warning, so a start below both levels announces the
    /// more severe one first. Both may fire in the same evaluation.
    pub fn evaluate(&mut self, instant_mv: u16, average_mv: u16, power_good: bool) -> Actions {
        let mut actions = Actions::new();

        if self.debug {
            info!("battery instant: {} mV, average: {} mV", instant_mv, average_mv);
        }

        if power_good {
            if self.cutoff_sent {
                info!("charging after cutoff, resuming normal operation");
                push(&mut actions, LowBatteryAction::ResumeNormalOperation);
            }
            self.warning_sent = false;
            self.cutoff_sent = false;
            return actions;
        }

        if average_mv < self.thresholds.cutoff_mv && !self.cutoff_sent {
            self.cutoff_sent = true;
            warn!("battery average {} mV below cutoff level", average_mv);
            announce(&mut actions, Alert::CutoffReached(average_mv), CUTOFF_VIBRATION);
        }

        if average_mv < self.thresholds.warning_mv && !self.warning_sent {
            self.warning_sent = true;
            warn!("battery average {} mV below warning level", average_mv);
            announce(&mut actions, Alert::WarningReached(average_mv), WARNING_VIBRATION);
        }

        actions
    }
}

/// Queues the host and display notifications and the vibration for `alert`
fn announce(actions: &mut Actions, alert: Alert, pattern: VibratePattern) {
    push(actions, LowBatteryAction::Notify { target: Target::Host, alert });
    push(actions, LowBatteryAction::Notify { target: Target::Display, alert });
    push(actions, LowBatteryAction::Vibrate(pattern));
}

/// Appends an action; the capacity covers every evaluation
fn push(actions: &mut Actions, action: LowBatteryAction) {
    if actions.push(action).is_err() {
        error!("low battery action queue full");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: BatteryThresholds = BatteryThresholds {
        warning_mv: 3500,
        cutoff_mv: 3300,
    };

    #[derive(Default)]
    struct MemoryStore {
        saved: Option<BatteryThresholds>,
        writes: usize,
    }

    impl ThresholdStore for MemoryStore {
        fn load(&mut self) -> Option<BatteryThresholds> {
            self.saved
        }

        fn store(&mut self, thresholds: &BatteryThresholds) {
            self.saved = Some(*thresholds);
            self.writes += 1;
        }
    }

    fn alerts(actions: &[LowBatteryAction]) -> impl Iterator<Item = Alert> + '_ {
        actions.iter().filter_map(|action| match action {
            LowBatteryAction::Notify {
                target: Target::Host,
                alert,
            } => Some(*alert),
            _ => None,
        })
    }

    #[test]
    fn healthy_battery_does_nothing() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        for average in [4200, 3900, 3500] {
            assert!(monitor.evaluate(average, average, false).is_empty());
        }
        assert!(!monitor.warning_sent());
        assert!(!monitor.cutoff_sent());
    }

    #[test]
    fn discharge_fires_each_alert_once() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        let mut emitted = std::vec::Vec::new();
        for average in [4000, 3600, 3400, 3200] {
            emitted.extend(alerts(&monitor.evaluate(average, average, false)));
        }
        assert_eq!(
            emitted,
            [Alert::WarningReached(3400), Alert::CutoffReached(3200)]
        );

        // staying low sends nothing new
        for average in [3150, 3100, 3400] {
            assert!(monitor.evaluate(average, average, false).is_empty());
        }
        assert!(monitor.warning_sent());
        assert!(monitor.cutoff_sent());
    }

    #[test]
    fn cold_start_below_both_sends_cutoff_first() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        let actions = monitor.evaluate(3200, 3200, false);
        assert_eq!(
            actions.as_slice(),
            [
                LowBatteryAction::Notify {
                    target: Target::Host,
                    alert: Alert::CutoffReached(3200)
                },
                LowBatteryAction::Notify {
                    target: Target::Display,
                    alert: Alert::CutoffReached(3200)
                },
                LowBatteryAction::Vibrate(CUTOFF_VIBRATION),
                LowBatteryAction::Notify {
                    target: Target::Host,
                    alert: Alert::WarningReached(3200)
                },
                LowBatteryAction::Notify {
                    target: Target::Display,
                    alert: Alert::WarningReached(3200)
                },
                LowBatteryAction::Vibrate(WARNING_VIBRATION),
            ]
        );
    }

    #[test]
    fn vibration_patterns_differ() {
        assert_ne!(CUTOFF_VIBRATION, WARNING_VIBRATION);
        assert!(CUTOFF_VIBRATION.on_ms < WARNING_VIBRATION.on_ms);
    }

    #[test]
    fn charging_rearms_and_resumes_once_after_cutoff() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        for average in [4000, 3600, 3400, 3200] {
            monitor.evaluate(average, average, false);
        }

        let actions = monitor.evaluate(3200, 3200, true);
        assert_eq!(actions.as_slice(), [LowBatteryAction::ResumeNormalOperation]);
        assert!(!monitor.warning_sent());
        assert!(!monitor.cutoff_sent());

        // still charging, nothing left to resume
        assert!(monitor.evaluate(3300, 3300, true).is_empty());

        // unplugged while still low, both alerts fire again
        let again: std::vec::Vec<_> = alerts(&monitor.evaluate(3250, 3250, false)).collect();
        assert_eq!(again, [Alert::CutoffReached(3250), Alert::WarningReached(3250)]);
    }

    #[test]
    fn charging_after_warning_only_does_not_resume() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        monitor.evaluate(3400, 3400, false);
        assert!(monitor.warning_sent());
        assert!(monitor.evaluate(3400, 3400, true).is_empty());
        assert!(!monitor.warning_sent());
    }

    #[test]
    fn charging_ignores_low_voltage() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        assert!(monitor.evaluate(2900, 2900, true).is_empty());
        assert!(!monitor.cutoff_sent());
    }

    #[test]
    fn check_uses_the_published_average() {
        let readings = ReadingStore::new();
        readings.publish(Channel::BatterySense, 3100, 3450);
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        let fired: std::vec::Vec<_> = alerts(&monitor.check(&readings, false)).collect();
        assert_eq!(fired, [Alert::WarningReached(3450)]);
    }

    #[test]
    fn check_waits_for_the_first_battery_reading() {
        let readings = ReadingStore::new();
        let mut monitor = BatteryMonitor::new(THRESHOLDS);

        assert!(monitor.check(&readings, false).is_empty());
        assert!(!monitor.warning_sent());
        assert!(!monitor.cutoff_sent());

        // other channels do not count as a battery reading
        readings.publish(Channel::LightSense, 91, 91);
        assert!(monitor.check(&readings, false).is_empty());

        readings.publish(Channel::BatterySense, 3200, 3200);
        let fired: std::vec::Vec<_> = alerts(&monitor.check(&readings, false)).collect();
        assert_eq!(fired, [Alert::CutoffReached(3200), Alert::WarningReached(3200)]);
    }

    #[test]
    fn coarse_levels_scale_by_hundred() {
        let thresholds = BatteryThresholds::from_coarse(36, 34);
        assert_eq!(thresholds.warning_mv, 3600);
        assert_eq!(thresholds.cutoff_mv, 3400);
    }

    #[test]
    fn set_battery_levels_persists_immediately() {
        let mut store = MemoryStore::default();
        let mut monitor = BatteryMonitor::new(BatteryThresholds::load_or_default(&mut store));
        assert_eq!(monitor.thresholds(), BatteryThresholds::DEFAULT);

        monitor.set_battery_levels(&mut store, 37, 35);
        assert_eq!(store.writes, 1);
        assert_eq!(
            BatteryThresholds::load_or_default(&mut store),
            BatteryThresholds {
                warning_mv: 3700,
                cutoff_mv: 3500
            }
        );
        assert_eq!(monitor.evaluate(3600, 3600, false).len(), 3);
    }

    #[test]
    fn new_thresholds_keep_latches() {
        let mut monitor = BatteryMonitor::new(THRESHOLDS);
        monitor.evaluate(3400, 3400, false);
        monitor.set_thresholds(BatteryThresholds::from_coarse(38, 36));
        let fired: std::vec::Vec<_> = alerts(&monitor.evaluate(3500, 3500, false)).collect();
        assert_eq!(fired, [Alert::CutoffReached(3500)]);
    }
}

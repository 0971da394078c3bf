//! Collaborators the sampling core drives: the converter, calibration data and
//! the low power mode bookkeeping.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::channel::Channel;

/// Register level access to the converter and the sense circuits.
///
/// Every method is a single side effecting step. The core never calls these
/// without holding the hardware gate.
pub trait AdcHardware {
    /// Powers up the sense circuit of `channel`
    fn enable_sense(&mut self, channel: Channel);

    /// Powers down the sense circuit of `channel`
    fn disable_sense(&mut self, channel: Channel);

    /// Switches on the shared voltage reference
    fn enable_reference(&mut self);

    /// Switches off the shared voltage reference
    fn disable_reference(&mut self);

    /// Selects the input of `channel` and starts a single conversion
    fn start_conversion(&mut self, channel: Channel);

    /// Whether a conversion is still in progress
    fn is_busy(&self) -> bool;

    /// Raw result of the last conversion on `channel`
    fn read_counts(&mut self, channel: Channel) -> u16;

    /// Stops and powers down the converter
    fn disable_converter(&mut self);
}

/// Factory calibration of the battery divider
pub trait Calibration {
    /// Whether the stored calibration may be used
    fn is_valid(&self) -> bool;

    /// Signed correction in millivolts added to each battery reading
    fn battery_offset(&self) -> i16;
}

/// Calibration source for boards that were never calibrated
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncalibrated;

impl Calibration for Uncalibrated {
    fn is_valid(&self) -> bool {
        false
    }

    fn battery_offset(&self) -> i16 {
        0
    }
}

/// Counts execution contexts that currently forbid the low power mode
#[derive(Debug)]
pub struct SleepInhibitor {
    /// Number of active holds
    holds: AtomicU32,
}

impl SleepInhibitor {
    /// Creates an inhibitor with no holds
    pub const fn new() -> Self {
        Self {
            holds: AtomicU32::new(0),
        }
    }

    /// Forbids the low power mode until the returned hold is dropped
    pub fn hold(&self) -> SleepHold<'_> {
        self.holds.fetch_add(1, Ordering::AcqRel);
        SleepHold {
            inhibitor: self,
            active: true,
        }
    }

    /// Whether any context currently forbids the low power mode
    #[cfg(test)]
    pub(crate) fn is_inhibited(&self) -> bool {
        self.holds.load(Ordering::Acquire) > 0
    }
}

impl Default for SleepInhibitor {
    fn default() -> Self {
        Self::new()
    }
}

/// One context's assertion that the low power mode must not be entered
#[derive(Debug)]
pub struct SleepHold<'a> {
    /// Inhibitor this hold counts against
    inhibitor: &'a SleepInhibitor,
    /// Whether the hold currently counts
    active: bool,
}

impl SleepHold<'_> {
    /// Lifts this hold while the owner is parked on something that does not
    /// need the clocks running
    pub fn suspend(&mut self) {
        if self.active {
            self.inhibitor.holds.fetch_sub(1, Ordering::AcqRel);
            self.active = false;
        }
    }

    /// Re-asserts a suspended hold
    pub fn resume(&mut self) {
        if !self.active {
            self.inhibitor.holds.fetch_add(1, Ordering::AcqRel);
            self.active = true;
        }
    }
}

impl Drop for SleepHold<'_> {
    fn drop(&mut self) {
        self.suspend();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_inhibits_until_dropped() {
        let inhibitor = SleepInhibitor::new();
        assert!(!inhibitor.is_inhibited());
        {
            let _hold = inhibitor.hold();
            assert!(inhibitor.is_inhibited());
        }
        assert!(!inhibitor.is_inhibited());
    }

    #[test]
    fn suspend_and_resume_are_idempotent() {
        let inhibitor = SleepInhibitor::new();
        let mut hold = inhibitor.hold();
        hold.suspend();
        hold.suspend();
        assert!(!inhibitor.is_inhibited());
        hold.resume();
        hold.resume();
        assert!(inhibitor.is_inhibited());
        drop(hold);
        assert!(!inhibitor.is_inhibited());
    }

    #[test]
    fn holds_from_several_contexts_stack() {
        let inhibitor = SleepInhibitor::new();
        let first = inhibitor.hold();
        let mut second = inhibitor.hold();
        second.suspend();
        assert!(inhibitor.is_inhibited());
        drop(first);
        assert!(!inhibitor.is_inhibited());
    }
}

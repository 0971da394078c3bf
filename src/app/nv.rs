//! Threshold storage for the firmware

use watch_sense::{BatteryThresholds, ThresholdStore};

/// Keeps the battery thresholds in RAM; they survive until the next reset.
// TODO: back this with embassy_rp::flash once a sector is reserved in memory.x
#[derive(Default)]
pub struct RamThresholdStore {
    /// Last written thresholds
    saved: Option<BatteryThresholds>,
}

impl ThresholdStore for RamThresholdStore {
    fn load(&mut self) -> Option<BatteryThresholds> {
        self.saved
    }

    fn store(&mut self, thresholds: &BatteryThresholds) {
        self.saved = Some(*thresholds);
    }
}

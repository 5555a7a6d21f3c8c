use serde::{Deserialize, Serialize};

/// Display-range (zoom) bounds and scan cadence.
///
/// The range is a read-only scale input to the transform for one tick;
/// callers adjust it in `range_step` increments within
/// `[min_range, max_range]` inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSettings {
    pub default_range: f32,
    pub min_range: f32,
    pub max_range: f32,
    pub range_step: f32,
    /// Target interval between scan/transform cycles (ms).
    pub poll_interval_ms: u64,
}

impl Default for RadarSettings {
    fn default() -> Self {
        Self {
            default_range: 1000.0,
            min_range: 100.0,
            max_range: 5000.0,
            range_step: 100.0,
            poll_interval_ms: 16,
        }
    }
}

impl RadarSettings {
    pub fn clamp_range(&self, range: f32) -> f32 {
        range.clamp(self.min_range, self.max_range)
    }
}

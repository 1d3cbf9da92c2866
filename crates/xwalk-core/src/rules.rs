//! Safety rules and thresholds for encounter evaluation.

use serde::{Deserialize, Serialize};

use crate::crossing::DEFAULT_NEAR_CROSSING_THRESHOLD_M;
use crate::metrics::VehicleEnvelope;

/// Configuration for safety rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyRules {
    /// Pedestrians closer than this to a crossing are "near" it, meters
    pub near_crossing_threshold_m: f64,
    /// Driver/ADS reaction time used for DRS, seconds
    pub reaction_time_s: f64,
    /// Ego vehicle footprint
    pub vehicle: VehicleEnvelope,
}

impl Default for SafetyRules {
    fn default() -> Self {
        Self {
            near_crossing_threshold_m: DEFAULT_NEAR_CROSSING_THRESHOLD_M,
            reaction_time_s: 1.0,
            vehicle: VehicleEnvelope::default(),
        }
    }
}

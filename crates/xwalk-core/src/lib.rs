//! Core engine for crossing near-miss analysis.
//!
//! Pure functions over an immutable [`ReferenceFrame`]: geodetic/planar
//! transforms, crossing proximity, conflict points and safety surrogate
//! metrics (TTC, PET, DRS). No I/O happens in this crate.

pub mod conflict;
pub mod crossing;
pub mod evaluate;
pub mod frame;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod spatial;
pub mod transform;

pub use conflict::{find_conflict_point, ConflictResult, NoConflictReason};
pub use crossing::{
    is_near_crossing, nearest_crossing_distance, CrossingFeature, CrossingId, CrossingProximity,
    NearCrossing, ProjectedCrossings, DEFAULT_NEAR_CROSSING_THRESHOLD_M,
};
pub use evaluate::{EncounterAssessment, EncounterEvaluator};
pub use frame::{FrameParams, GeodeticPoint, PlanarPoint, ReferenceFrame};
pub use metrics::{
    deceleration_to_stop, post_encroachment_time, Metric, SurrogateMetrics, UndefinedMetric,
    VehicleEnvelope,
};
pub use models::{
    AgentSnapshot, EgoTelemetry, HistoryEntry, HistoryResponse, PedestrianTelemetry, RiskRecord,
};
pub use rules::SafetyRules;
pub use spatial::{great_circle_distance, line_coefficients, track_segments, LineCoefficients};
pub use transform::{to_geodetic, to_planar, TransformError};

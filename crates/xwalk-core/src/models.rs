//! Telemetry wire models and the persisted risk record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::crossing::CrossingId;
use crate::frame::{GeodeticPoint, PlanarPoint, ReferenceFrame};
use crate::transform::to_planar;

/// Response envelope of the telemetry history API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryResponse {
    #[serde(default)]
    pub response_type: Option<i64>,
    #[serde(default)]
    pub response: Vec<HistoryEntry>,
}

impl HistoryResponse {
    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }
}

/// One recorded row. The payload is a JSON document encoded as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoryEntry {
    pub json: String,
    #[serde(default)]
    pub seq_id: Option<u64>,
    /// Recording time, e.g. `2024-05-09T17:33:11.014`.
    pub time: String,
    /// Correlation/channel id.
    #[serde(default)]
    pub chid: Option<i64>,
    #[serde(default)]
    pub flags: Option<i64>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub events: Vec<String>,
}

impl HistoryEntry {
    /// Decode the nested payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.json)
    }
}

/// Ego vehicle motion record (`MotionData`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EgoTelemetry {
    pub latitude: f64,
    pub longitude: f64,
    /// m/s
    pub speed: f64,
    /// Degrees clockwise from north.
    pub direction: f64,
    pub front_lat: f64,
    pub front_long: f64,
    #[serde(default)]
    pub rear_lat: Option<f64>,
    #[serde(default)]
    pub rear_long: Option<f64>,
    #[serde(default)]
    pub acceleration: Option<f64>,
    #[serde(default)]
    pub steer: Option<f64>,
    #[serde(default)]
    pub brake: Option<f64>,
}

impl EgoTelemetry {
    pub fn position(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.latitude, self.longitude)
    }

    pub fn front(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.front_lat, self.front_long)
    }
}

/// Detected road user record (`MotionDetectionData`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PedestrianTelemetry {
    pub vehicle_id: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub direction: f64,
    #[serde(default)]
    pub front_lat: Option<f64>,
    #[serde(default)]
    pub front_long: Option<f64>,
    #[serde(default)]
    pub rear_lat: Option<f64>,
    #[serde(default)]
    pub rear_long: Option<f64>,
}

impl PedestrianTelemetry {
    pub fn position(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.latitude, self.longitude)
    }
}

/// Planar position and motion of one agent at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: PlanarPoint,
    /// Degrees clockwise from north.
    pub heading_deg: f64,
    /// m/s
    pub speed_mps: f64,
}

impl AgentSnapshot {
    /// Snapshot anchored at the vehicle's front reference point.
    pub fn ego_front(frame: &ReferenceFrame, ego: &EgoTelemetry) -> Self {
        Self {
            position: to_planar(frame, ego.front()),
            heading_deg: ego.direction,
            speed_mps: ego.speed,
        }
    }

    pub fn pedestrian(frame: &ReferenceFrame, pedestrian: &PedestrianTelemetry) -> Self {
        Self {
            position: to_planar(frame, pedestrian.position()),
            heading_deg: pedestrian.direction,
            speed_mps: pedestrian.speed,
        }
    }
}

/// Flat per-pedestrian, per-timestep result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RiskRecord {
    pub pedestrian_id: String,
    pub chid: Option<i64>,
    pub time: String,
    #[serde(with = "bool_as_int")]
    pub near_crossing: bool,
    pub crossing_id: Option<CrossingId>,
    #[serde(rename = "TTC")]
    pub ttc: Option<f64>,
    #[serde(rename = "DRS", default, skip_serializing_if = "Option::is_none")]
    pub drs: Option<f64>,
}

mod bool_as_int {
    use super::*;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

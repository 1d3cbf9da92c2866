//! Pedestrian proximity to mapped crossings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::{GeodeticPoint, PlanarPoint, ReferenceFrame};
use crate::spatial::distance_to_polyline;
use crate::transform::to_planar;

/// Pedestrians closer than this to a crossing polyline count as "near", meters.
pub const DEFAULT_NEAR_CROSSING_THRESHOLD_M: f64 = 50.0;

/// Map identifier of a crossing, kept in the form the map stores it.
///
/// Serializes untagged so numeric ids stay numbers in result files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CrossingId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CrossingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossingId::Number(n) => write!(f, "{}", n),
            CrossingId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CrossingId {
    fn from(value: i64) -> Self {
        CrossingId::Number(value)
    }
}

impl From<String> for CrossingId {
    fn from(value: String) -> Self {
        CrossingId::Text(value)
    }
}

impl From<&str> for CrossingId {
    fn from(value: &str) -> Self {
        CrossingId::Text(value.to_string())
    }
}

/// A mapped pedestrian crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossingFeature {
    pub id: CrossingId,
    /// Ordered polyline vertices.
    pub vertices: Vec<GeodeticPoint>,
}

impl CrossingFeature {
    pub fn new(id: impl Into<CrossingId>, vertices: Vec<GeodeticPoint>) -> Self {
        Self {
            id: id.into(),
            vertices,
        }
    }
}

/// Result of a nearest-crossing query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingProximity<'a> {
    /// Distance to the closest polyline; infinite when nothing was measured.
    pub distance_m: f64,
    pub crossing: Option<&'a CrossingFeature>,
}

/// Outcome of the near-crossing test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearCrossing {
    pub near: bool,
    pub crossing_id: Option<CrossingId>,
}

/// Crossing polylines projected into one frame, reused across many queries.
#[derive(Debug, Clone)]
pub struct ProjectedCrossings {
    features: Vec<CrossingFeature>,
    polylines: Vec<Vec<PlanarPoint>>,
}

impl ProjectedCrossings {
    /// Project every vertex of every crossing into `frame`.
    pub fn project(frame: &ReferenceFrame, crossings: &[CrossingFeature]) -> Self {
        let polylines = crossings
            .iter()
            .map(|feature| {
                feature
                    .vertices
                    .iter()
                    .map(|vertex| to_planar(frame, *vertex))
                    .collect()
            })
            .collect();
        Self {
            features: crossings.to_vec(),
            polylines,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[CrossingFeature] {
        &self.features
    }

    /// Closest crossing to `point`.
    ///
    /// Ties keep the first minimal feature in input order. Crossings without
    /// vertices are skipped.
    pub fn nearest(&self, point: PlanarPoint) -> CrossingProximity<'_> {
        match self.nearest_index(point) {
            Some((index, distance_m)) => CrossingProximity {
                distance_m,
                crossing: Some(&self.features[index]),
            },
            None => CrossingProximity::none(),
        }
    }

    /// Index (in input order) and distance of the closest crossing.
    fn nearest_index(&self, point: PlanarPoint) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (index, polyline) in self.polylines.iter().enumerate() {
            let Some(distance) = distance_to_polyline(point, polyline) else {
                continue;
            };
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best
    }
}

impl CrossingProximity<'_> {
    fn none() -> Self {
        Self {
            distance_m: f64::INFINITY,
            crossing: None,
        }
    }
}

/// Minimum planar distance from `point` to any crossing, with the owning
/// feature.
///
/// Projects the polylines on every call; batch callers should hold a
/// [`ProjectedCrossings`] instead.
pub fn nearest_crossing_distance<'a>(
    frame: &ReferenceFrame,
    point: PlanarPoint,
    crossings: &'a [CrossingFeature],
) -> CrossingProximity<'a> {
    // Projection preserves input order, so the index maps back into `crossings`.
    match ProjectedCrossings::project(frame, crossings).nearest_index(point) {
        Some((index, distance_m)) => CrossingProximity {
            distance_m,
            crossing: Some(&crossings[index]),
        },
        None => CrossingProximity::none(),
    }
}

/// Whether a measured distance counts as being near the crossing.
pub fn is_near_crossing(
    distance_m: f64,
    crossing: Option<&CrossingFeature>,
    threshold_m: f64,
) -> NearCrossing {
    match crossing {
        Some(feature) if distance_m < threshold_m => NearCrossing {
            near: true,
            crossing_id: Some(feature.id.clone()),
        },
        _ => NearCrossing {
            near: false,
            crossing_id: None,
        },
    }
}

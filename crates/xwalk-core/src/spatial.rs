//! Spatial math: great-circle distance and planar point/segment/line helpers.

use serde::{Deserialize, Serialize};

use crate::frame::{GeodeticPoint, PlanarPoint};

/// Mean Earth radius used for great-circle distances, meters.
pub const EARTH_RADIUS_M: f64 = 6_371_393.0;

/// Segments shorter than this (squared, m²) are treated as points.
const DEGENERATE_SEGMENT_SQ_M: f64 = 1e-12;

/// Calculate distance between two points in meters using the Haversine formula.
///
/// # Arguments
/// * `p1`, `p2` - Points in decimal degrees
///
/// # Returns
/// Distance in meters. Symmetric, and zero for identical points.
pub fn great_circle_distance(p1: GeodeticPoint, p2: GeodeticPoint) -> f64 {
    let half_dlat = ((p2.latitude - p1.latitude) / 2.0).to_radians();
    let half_dlon = ((p2.longitude - p1.longitude) / 2.0).to_radians();
    let a = half_dlat.sin().powi(2)
        + p1.latitude.to_radians().cos()
            * p2.latitude.to_radians().cos()
            * half_dlon.sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Minimum distance from a point to a line segment (in meters).
///
/// # Arguments
/// * `point` - The point to measure from
/// * `seg_start`, `seg_end` - Segment endpoints
pub fn distance_to_segment(point: PlanarPoint, seg_start: PlanarPoint, seg_end: PlanarPoint) -> f64 {
    let px = point.x - seg_start.x;
    let py = point.y - seg_start.y;
    let sx = seg_end.x - seg_start.x;
    let sy = seg_end.y - seg_start.y;

    let seg_len_sq = sx * sx + sy * sy;
    if seg_len_sq < DEGENERATE_SEGMENT_SQ_M {
        // Segment is essentially a point
        return px.hypot(py);
    }

    // Project point onto segment line: t = ((P-A) · (B-A)) / |B-A|²
    let t = ((px * sx + py * sy) / seg_len_sq).clamp(0.0, 1.0);

    (px - t * sx).hypot(py - t * sy)
}

/// Minimum distance from a point to a connected chain of segments.
///
/// A single vertex is measured as a point; an empty chain yields `None`.
pub fn distance_to_polyline(point: PlanarPoint, vertices: &[PlanarPoint]) -> Option<f64> {
    match vertices {
        [] => None,
        [only] => Some(point.distance(only)),
        _ => vertices
            .windows(2)
            .map(|pair| distance_to_segment(point, pair[0], pair[1]))
            .reduce(f64::min),
    }
}

/// Implicit line `a·x + b·y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineCoefficients {
    /// Perpendicular distance from `point` to the infinite line.
    ///
    /// `None` when both defining points coincided.
    pub fn distance_to(&self, point: PlanarPoint) -> Option<f64> {
        let norm = self.a.hypot(self.b);
        if norm <= f64::EPSILON {
            return None;
        }
        Some((self.a * point.x + self.b * point.y + self.c).abs() / norm)
    }
}

/// Line through two planar points.
pub fn line_coefficients(p1: PlanarPoint, p2: PlanarPoint) -> LineCoefficients {
    LineCoefficients {
        a: p2.y - p1.y,
        b: p1.x - p2.x,
        c: p2.x * p1.y - p1.x * p2.y,
    }
}

/// Line coefficients for each successive pair of trajectory points.
pub fn track_segments(points: &[PlanarPoint]) -> Vec<LineCoefficients> {
    points
        .windows(2)
        .map(|pair| line_coefficients(pair[0], pair[1]))
        .collect()
}

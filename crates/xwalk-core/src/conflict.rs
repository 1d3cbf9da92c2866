//! Conflict point detection for an ego vehicle and a pedestrian.
//!
//! Each agent's future path is an infinite straight ray from its current
//! planar position along its heading. A conflict exists when the two rays
//! cross ahead of both agents.

use serde::{Deserialize, Serialize};

use crate::frame::PlanarPoint;

/// Rays whose direction cross product is below this are treated as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// Agents slower than this have no direction of travel, m/s.
const MOVING_SPEED_EPS: f64 = 1e-7;

/// Why no conflict point exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoConflictReason {
    /// Headings are parallel (or identical); the paths never cross.
    Parallel,
    /// The crossing lies behind the ego vehicle.
    BehindEgo,
    /// The crossing lies behind the pedestrian.
    BehindPedestrian,
}

/// Outcome of [`find_conflict_point`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictResult {
    Conflict {
        point: PlanarPoint,
        /// Distance the ego front travels to reach the point, meters.
        ego_travel_m: f64,
        /// Distance the pedestrian travels to reach the point, meters.
        pedestrian_travel_m: f64,
    },
    NoConflict {
        reason: NoConflictReason,
    },
}

impl ConflictResult {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConflictResult::Conflict { .. })
    }

    pub fn point(&self) -> Option<PlanarPoint> {
        match self {
            ConflictResult::Conflict { point, .. } => Some(*point),
            ConflictResult::NoConflict { .. } => None,
        }
    }
}

/// Unit direction of a heading given in degrees clockwise from north.
pub fn heading_vector(heading_deg: f64) -> (f64, f64) {
    let (sin, cos) = heading_deg.to_radians().sin_cos();
    (sin, cos)
}

fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

/// Find where the ego vehicle's and the pedestrian's straight-line paths meet.
///
/// Headings are degrees clockwise from north. Cardinal headings need no
/// special handling since paths are intersected in direction-vector form:
/// with `d = (sin h, cos h)`, solve `e + s·d_e = p + u·d_p` and require
/// `s >= 0` and `u >= 0`.
///
/// A stationary agent has no direction of travel, so it never rejects a
/// crossing as being behind it.
pub fn find_conflict_point(
    ego_front: PlanarPoint,
    ego_heading_deg: f64,
    ego_speed: f64,
    pedestrian: PlanarPoint,
    pedestrian_heading_deg: f64,
    pedestrian_speed: f64,
) -> ConflictResult {
    let d_e = heading_vector(ego_heading_deg);
    let d_p = heading_vector(pedestrian_heading_deg);

    let det = cross(d_e, d_p);
    if !det.is_finite() || det.abs() <= PARALLEL_EPS {
        return ConflictResult::NoConflict {
            reason: NoConflictReason::Parallel,
        };
    }

    let offset = (pedestrian.x - ego_front.x, pedestrian.y - ego_front.y);
    let s = cross(offset, d_p) / det;
    let u = cross(offset, d_e) / det;

    if s < 0.0 && ego_speed >= MOVING_SPEED_EPS {
        return ConflictResult::NoConflict {
            reason: NoConflictReason::BehindEgo,
        };
    }
    if u < 0.0 && pedestrian_speed >= MOVING_SPEED_EPS {
        return ConflictResult::NoConflict {
            reason: NoConflictReason::BehindPedestrian,
        };
    }

    ConflictResult::Conflict {
        point: PlanarPoint::new(ego_front.x + s * d_e.0, ego_front.y + s * d_e.1),
        ego_travel_m: s.abs(),
        pedestrian_travel_m: u.abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point(result: ConflictResult, x: f64, y: f64) {
        let point = result.point().expect("expected a conflict");
        assert!((point.x - x).abs() < 1e-9, "x = {}", point.x);
        assert!((point.y - y).abs() < 1e-9, "y = {}", point.y);
    }

    #[test]
    fn identical_headings_are_parallel() {
        let result = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            45.0,
            10.0,
            PlanarPoint::new(5.0, 0.0),
            45.0,
            1.2,
        );
        assert_eq!(
            result,
            ConflictResult::NoConflict {
                reason: NoConflictReason::Parallel
            }
        );
        assert!(!result.is_conflict());
    }

    #[test]
    fn opposite_headings_are_parallel() {
        let result = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            90.0,
            10.0,
            PlanarPoint::new(20.0, 3.0),
            270.0,
            1.0,
        );
        assert_eq!(result.point(), None);
    }

    #[test]
    fn northbound_vehicle_meets_westbound_pedestrian() {
        // Heading 0° is singular for a cotangent slope; here it is ordinary.
        let result = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            0.0,
            8.0,
            PlanarPoint::new(10.0, 30.0),
            270.0,
            1.4,
        );
        assert_point(result, 0.0, 30.0);
        match result {
            ConflictResult::Conflict {
                ego_travel_m,
                pedestrian_travel_m,
                ..
            } => {
                assert!((ego_travel_m - 30.0).abs() < 1e-9);
                assert!((pedestrian_travel_m - 10.0).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn southbound_vehicle_meets_eastbound_pedestrian() {
        let result = find_conflict_point(
            PlanarPoint::new(5.0, 50.0),
            180.0,
            8.0,
            PlanarPoint::new(-5.0, 20.0),
            90.0,
            1.4,
        );
        assert_point(result, 5.0, 20.0);
    }

    #[test]
    fn matches_slope_form_for_oblique_headings() {
        let ego = PlanarPoint::new(-12.0, 40.0);
        let ped = PlanarPoint::new(15.0, 2.0);
        let (h_e, h_p) = (160.95483398600914_f64, -37.925715339300382_f64);

        let cot_e = 1.0 / h_e.to_radians().tan();
        let cot_p = 1.0 / h_p.to_radians().tan();
        let x = (ped.y - ego.y + cot_e * ego.x - cot_p * ped.x) / (cot_e - cot_p);
        let y = ego.y + cot_e * (x - ego.x);

        let result = find_conflict_point(ego, h_e, 6.7, ped, h_p, 1.17);
        assert_point(result, x, y);
    }

    #[test]
    fn crossing_behind_either_agent_is_rejected() {
        // Vehicle heading east from x=0, pedestrian path crosses at x=-10.
        let behind_ego = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            90.0,
            10.0,
            PlanarPoint::new(-10.0, 10.0),
            180.0,
            1.0,
        );
        assert_eq!(
            behind_ego,
            ConflictResult::NoConflict {
                reason: NoConflictReason::BehindEgo
            }
        );

        // Pedestrian walking north away from the vehicle's path.
        let behind_ped = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            90.0,
            10.0,
            PlanarPoint::new(10.0, 10.0),
            0.0,
            1.0,
        );
        assert_eq!(
            behind_ped,
            ConflictResult::NoConflict {
                reason: NoConflictReason::BehindPedestrian
            }
        );
    }

    #[test]
    fn stationary_agent_does_not_reject_crossing() {
        let result = find_conflict_point(
            PlanarPoint::new(0.0, 0.0),
            90.0,
            0.0,
            PlanarPoint::new(-10.0, 10.0),
            180.0,
            1.0,
        );
        assert_point(result, -10.0, 0.0);
    }
}

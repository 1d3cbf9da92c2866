//! Safety surrogate metrics: TTC, PET and DRS.

use serde::{Deserialize, Serialize, Serializer};

use crate::frame::PlanarPoint;

/// Agents slower than this are treated as stationary, m/s.
pub const STATIONARY_SPEED_EPS: f64 = 1e-7;

/// Why a metric has no meaningful value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedMetric {
    /// One of the agents is (effectively) not moving.
    StationaryAgent { ego_speed: f64, pedestrian_speed: f64 },
    /// The vehicle is already inside its reaction-plus-stopping envelope.
    InsideReactionEnvelope { distance_m: f64, reaction_distance_m: f64 },
    /// The paths never meet ahead of both agents.
    NoConflict,
    /// An input was NaN or infinite.
    NonFiniteInput,
}

/// A metric value, or an explicit reason why there is none.
///
/// Serializes as a bare number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    Undefined(UndefinedMetric),
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    fn checked(value: f64) -> Self {
        if value.is_finite() {
            Metric::Value(value)
        } else {
            Metric::Undefined(UndefinedMetric::NonFiniteInput)
        }
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

/// Physical footprint of the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleEnvelope {
    pub length_m: f64,
    pub width_m: f64,
}

impl Default for VehicleEnvelope {
    fn default() -> Self {
        Self {
            length_m: 5.272,
            width_m: 2.345,
        }
    }
}

/// Surrogate metric calculator for one ego vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurrogateMetrics {
    pub vehicle: VehicleEnvelope,
}

impl SurrogateMetrics {
    pub fn new(vehicle: VehicleEnvelope) -> Self {
        Self { vehicle }
    }

    /// Time to Collision at `conflict`, seconds.
    ///
    /// When the vehicle reaches the point first the pedestrian's arrival time
    /// is reported. Otherwise the pedestrian must also clear half the vehicle
    /// width past the point, and the larger of that and the vehicle's arrival
    /// time is reported.
    pub fn time_to_collision(
        &self,
        conflict: PlanarPoint,
        pedestrian: PlanarPoint,
        ego_front: PlanarPoint,
        pedestrian_speed: f64,
        ego_speed: f64,
    ) -> Metric {
        if !pedestrian_speed.is_finite() || !ego_speed.is_finite() {
            return Metric::Undefined(UndefinedMetric::NonFiniteInput);
        }
        if ego_speed < STATIONARY_SPEED_EPS || pedestrian_speed < STATIONARY_SPEED_EPS {
            return Metric::Undefined(UndefinedMetric::StationaryAgent {
                ego_speed,
                pedestrian_speed,
            });
        }

        let ego_distance = conflict.distance(&ego_front);
        let pedestrian_distance = conflict.distance(&pedestrian);
        let t_vehicle = ego_distance / ego_speed;
        let t_pedestrian = pedestrian_distance / pedestrian_speed;

        if t_vehicle < t_pedestrian {
            // vehicle passes first
            return Metric::checked(t_pedestrian);
        }

        let t_clear = (pedestrian_distance + self.vehicle.width_m / 2.0) / pedestrian_speed;
        Metric::checked(t_clear.max(t_vehicle))
    }
}

/// Post-Encroachment Time from conflict-zone entry/exit timestamps, seconds.
///
/// `tv1`/`tv2` are the vehicle's entry/exit, `tp1`/`tp2` the pedestrian's.
pub fn post_encroachment_time(tv1: f64, tv2: f64, tp1: f64, tp2: f64) -> f64 {
    if tv2 < tp1 {
        // vehicle leaves before the pedestrian enters
        tp1 - tv2
    } else {
        tv1 - tp2
    }
}

/// Deceleration rate required to stop, m/s².
///
/// Undefined when the remaining distance does not exceed the distance
/// covered during the reaction time.
pub fn deceleration_to_stop(speed: f64, reaction_time_s: f64, distance_m: f64) -> Metric {
    if !speed.is_finite() || !reaction_time_s.is_finite() || !distance_m.is_finite() {
        return Metric::Undefined(UndefinedMetric::NonFiniteInput);
    }
    let reaction_distance_m = speed * reaction_time_s;
    if distance_m <= reaction_distance_m {
        return Metric::Undefined(UndefinedMetric::InsideReactionEnvelope {
            distance_m,
            reaction_distance_m,
        });
    }
    Metric::checked(speed * speed / (2.0 * (distance_m - reaction_distance_m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssm() -> SurrogateMetrics {
        SurrogateMetrics::default()
    }

    #[test]
    fn ttc_undefined_for_stationary_agents() {
        let p = PlanarPoint::new(0.0, 0.0);
        let q = PlanarPoint::new(10.0, 0.0);
        assert!(matches!(
            ssm().time_to_collision(p, q, q, 0.0, 5.0),
            Metric::Undefined(UndefinedMetric::StationaryAgent { .. })
        ));
        assert!(matches!(
            ssm().time_to_collision(p, q, q, 1.0, 0.0),
            Metric::Undefined(UndefinedMetric::StationaryAgent { .. })
        ));
    }

    #[test]
    fn ttc_reports_pedestrian_time_when_vehicle_passes_first() {
        let conflict = PlanarPoint::new(0.0, 0.0);
        let ego_front = PlanarPoint::new(0.0, -20.0);
        let pedestrian = PlanarPoint::new(6.0, 0.0);
        // vehicle: 20 m at 10 m/s = 2 s; pedestrian: 6 m at 1.5 m/s = 4 s
        let ttc = ssm().time_to_collision(conflict, pedestrian, ego_front, 1.5, 10.0);
        assert_eq!(ttc, Metric::Value(4.0));
    }

    #[test]
    fn ttc_includes_vehicle_half_width_when_pedestrian_first() {
        let conflict = PlanarPoint::new(0.0, 0.0);
        let ego_front = PlanarPoint::new(0.0, -50.0);
        let pedestrian = PlanarPoint::new(2.0, 0.0);
        // vehicle: 5 s; pedestrian clears (2 + 1.1725) / 1 = 3.1725 s
        let ttc = ssm().time_to_collision(conflict, pedestrian, ego_front, 1.0, 10.0);
        assert_eq!(ttc, Metric::Value(5.0));

        // Vehicle arrives just after the pedestrian: clearance time wins.
        let ego_front = PlanarPoint::new(0.0, -3.0);
        let ttc = ssm().time_to_collision(conflict, pedestrian, ego_front, 1.0, 1.0);
        let expected = 2.0 + 2.345 / 2.0;
        assert!((ttc.value().unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn pet_branches() {
        assert_eq!(post_encroachment_time(0.0, 2.0, 3.5, 6.0), 1.5);
        assert_eq!(post_encroachment_time(5.0, 7.0, 1.0, 4.0), 1.0);
    }

    #[test]
    fn drs_reference_values() {
        assert!(matches!(
            deceleration_to_stop(10.0, 1.0, 5.0),
            Metric::Undefined(UndefinedMetric::InsideReactionEnvelope { .. })
        ));
        assert!(!deceleration_to_stop(10.0, 1.0, 10.0).is_defined());
        assert_eq!(deceleration_to_stop(10.0, 1.0, 20.0), Metric::Value(5.0));
        assert_eq!(deceleration_to_stop(0.0, 1.0, 20.0), Metric::Value(0.0));
    }

    #[test]
    fn drs_rejects_non_finite_input() {
        assert_eq!(
            deceleration_to_stop(f64::NAN, 1.0, 20.0),
            Metric::Undefined(UndefinedMetric::NonFiniteInput)
        );
    }

    #[test]
    fn metric_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&Metric::Value(1.5)).unwrap(), "1.5");
        assert_eq!(
            serde_json::to_string(&Metric::Undefined(UndefinedMetric::NoConflict)).unwrap(),
            "null"
        );
    }
}

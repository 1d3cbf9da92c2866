//! One ego/pedestrian snapshot in, one risk assessment out.

use serde::Serialize;

use crate::conflict::{find_conflict_point, ConflictResult};
use crate::crossing::{is_near_crossing, CrossingFeature, CrossingId, ProjectedCrossings};
use crate::frame::ReferenceFrame;
use crate::metrics::{deceleration_to_stop, Metric, SurrogateMetrics, UndefinedMetric};
use crate::models::{AgentSnapshot, EgoTelemetry, PedestrianTelemetry, RiskRecord};
use crate::rules::SafetyRules;

/// Everything computed for one matched pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterAssessment {
    pub near_crossing: bool,
    pub crossing_id: Option<CrossingId>,
    /// Infinite when no crossings are loaded.
    pub crossing_distance_m: f64,
    pub conflict: ConflictResult,
    pub ttc: Metric,
    /// Deceleration the vehicle needs to stop before the conflict point.
    pub drs: Metric,
}

impl EncounterAssessment {
    pub fn into_record(self, pedestrian_id: String, chid: Option<i64>, time: String) -> RiskRecord {
        RiskRecord {
            pedestrian_id,
            chid,
            time,
            near_crossing: self.near_crossing,
            crossing_id: self.crossing_id,
            ttc: self.ttc.value(),
            drs: self.drs.value(),
        }
    }
}

/// Evaluates matched pairs against one frame and one crossing set.
///
/// Holds only read-only data, so a single evaluator can be shared across
/// threads.
#[derive(Debug, Clone)]
pub struct EncounterEvaluator {
    frame: ReferenceFrame,
    rules: SafetyRules,
    metrics: SurrogateMetrics,
    crossings: ProjectedCrossings,
}

impl EncounterEvaluator {
    pub fn new(frame: ReferenceFrame, rules: SafetyRules, crossings: &[CrossingFeature]) -> Self {
        Self {
            frame,
            rules,
            metrics: SurrogateMetrics::new(rules.vehicle),
            crossings: ProjectedCrossings::project(&frame, crossings),
        }
    }

    pub fn frame(&self) -> &ReferenceFrame {
        &self.frame
    }

    pub fn rules(&self) -> &SafetyRules {
        &self.rules
    }

    pub fn crossing_count(&self) -> usize {
        self.crossings.len()
    }

    pub fn evaluate(&self, ego: &EgoTelemetry, pedestrian: &PedestrianTelemetry) -> EncounterAssessment {
        let ego = AgentSnapshot::ego_front(&self.frame, ego);
        let ped = AgentSnapshot::pedestrian(&self.frame, pedestrian);

        let proximity = self.crossings.nearest(ped.position);
        let near = is_near_crossing(
            proximity.distance_m,
            proximity.crossing,
            self.rules.near_crossing_threshold_m,
        );

        let conflict = find_conflict_point(
            ego.position,
            ego.heading_deg,
            ego.speed_mps,
            ped.position,
            ped.heading_deg,
            ped.speed_mps,
        );

        let (ttc, drs) = match conflict.point() {
            Some(point) => (
                self.metrics.time_to_collision(
                    point,
                    ped.position,
                    ego.position,
                    ped.speed_mps,
                    ego.speed_mps,
                ),
                deceleration_to_stop(
                    ego.speed_mps,
                    self.rules.reaction_time_s,
                    point.distance(&ego.position),
                ),
            ),
            None => (
                Metric::Undefined(UndefinedMetric::NoConflict),
                Metric::Undefined(UndefinedMetric::NoConflict),
            ),
        };

        EncounterAssessment {
            near_crossing: near.near,
            crossing_id: near.crossing_id,
            crossing_distance_m: proximity.distance_m,
            conflict,
            ttc,
            drs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{GeodeticPoint, PlanarPoint};
    use crate::transform::to_geodetic;

    fn ego_at(frame: &ReferenceFrame, front: PlanarPoint, direction: f64, speed: f64) -> EgoTelemetry {
        let geo = to_geodetic(frame, front).unwrap();
        EgoTelemetry {
            latitude: geo.latitude,
            longitude: geo.longitude,
            speed,
            direction,
            front_lat: geo.latitude,
            front_long: geo.longitude,
            rear_lat: None,
            rear_long: None,
            acceleration: None,
            steer: None,
            brake: None,
        }
    }

    fn pedestrian_at(frame: &ReferenceFrame, at: PlanarPoint, direction: f64, speed: f64) -> PedestrianTelemetry {
        let geo = to_geodetic(frame, at).unwrap();
        PedestrianTelemetry {
            vehicle_id: "p-1".to_string(),
            vehicle_type: Some("Pedestrian".to_string()),
            latitude: geo.latitude,
            longitude: geo.longitude,
            speed,
            direction,
            front_lat: None,
            front_long: None,
            rear_lat: None,
            rear_long: None,
        }
    }

    fn crossing(frame: &ReferenceFrame) -> CrossingFeature {
        let a: GeodeticPoint = to_geodetic(frame, PlanarPoint::new(-10.0, 30.0)).unwrap();
        let b: GeodeticPoint = to_geodetic(frame, PlanarPoint::new(10.0, 30.0)).unwrap();
        CrossingFeature::new("zebra-1", vec![a, b])
    }

    #[test]
    fn crossing_pedestrian_gets_ttc_and_crossing_id() {
        let frame = ReferenceFrame::ccta_martinez();
        let evaluator = EncounterEvaluator::new(frame, SafetyRules::default(), &[crossing(&frame)]);

        // Vehicle northbound at 10 m/s, 30 m short of the crossing.
        // Pedestrian westbound at 1 m/s, 5 m east of the vehicle's path.
        let ego = ego_at(&frame, PlanarPoint::new(0.0, 0.0), 0.0, 10.0);
        let ped = pedestrian_at(&frame, PlanarPoint::new(5.0, 30.0), 270.0, 1.0);

        let assessment = evaluator.evaluate(&ego, &ped);
        assert!(assessment.near_crossing);
        assert_eq!(assessment.crossing_id, Some(CrossingId::from("zebra-1")));
        assert!(assessment.crossing_distance_m < 1e-6);

        let point = assessment.conflict.point().unwrap();
        assert!(point.x.abs() < 1e-6);
        assert!((point.y - 30.0).abs() < 1e-6);

        // vehicle arrives in 3 s, before the pedestrian's 5 s
        let ttc = assessment.ttc.value().unwrap();
        assert!((ttc - 5.0).abs() < 1e-6);

        // 10² / (2 · (30 − 10))
        let drs = assessment.drs.value().unwrap();
        assert!((drs - 2.5).abs() < 1e-6);
    }

    #[test]
    fn diverging_pedestrian_has_no_ttc() {
        let frame = ReferenceFrame::ccta_martinez();
        let evaluator = EncounterEvaluator::new(frame, SafetyRules::default(), &[]);

        let ego = ego_at(&frame, PlanarPoint::new(0.0, 0.0), 0.0, 10.0);
        let ped = pedestrian_at(&frame, PlanarPoint::new(5.0, 30.0), 90.0, 1.0);

        let assessment = evaluator.evaluate(&ego, &ped);
        assert!(!assessment.near_crossing);
        assert!(!assessment.conflict.is_conflict());
        assert_eq!(assessment.ttc, Metric::Undefined(UndefinedMetric::NoConflict));

        let record = assessment.into_record("p-1".to_string(), Some(1), "t".to_string());
        assert_eq!(record.ttc, None);
        assert_eq!(record.crossing_id, None);
    }
}

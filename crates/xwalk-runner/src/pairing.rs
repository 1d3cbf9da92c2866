//! Pair pedestrian rows with the ego row recorded at the same instant and
//! evaluate each pair.

use std::collections::HashMap;

use xwalk_core::{
    EgoTelemetry, EncounterEvaluator, HistoryEntry, HistoryResponse, PedestrianTelemetry,
    RiskRecord,
};

/// Ego rows keyed by their `Time` string. The first row wins on duplicates.
pub struct EgoIndex<'a> {
    by_time: HashMap<&'a str, &'a HistoryEntry>,
}

impl<'a> EgoIndex<'a> {
    pub fn new(ego: &'a HistoryResponse) -> Self {
        let mut by_time = HashMap::with_capacity(ego.response.len());
        for entry in &ego.response {
            by_time.entry(entry.time.as_str()).or_insert(entry);
        }
        Self { by_time }
    }

    /// Ego row recorded at the same time as `pedestrian`.
    pub fn corresponding(&self, pedestrian: &HistoryEntry) -> Option<&'a HistoryEntry> {
        self.by_time.get(pedestrian.time.as_str()).copied()
    }
}

/// Records of one window plus what had to be dropped.
#[derive(Debug, Default)]
pub struct WindowOutcome {
    pub records: Vec<RiskRecord>,
    /// Pedestrian rows without an ego row at the same time.
    pub unpaired: usize,
    /// Rows whose nested payload failed to decode.
    pub malformed: usize,
}

/// Evaluate every pedestrian row of a window against its ego row.
pub fn evaluate_window(
    evaluator: &EncounterEvaluator,
    ego: &HistoryResponse,
    pedestrians: &HistoryResponse,
) -> WindowOutcome {
    let index = EgoIndex::new(ego);
    let mut outcome = WindowOutcome::default();

    for pedestrian_row in &pedestrians.response {
        let Some(ego_row) = index.corresponding(pedestrian_row) else {
            tracing::debug!("No ego record at {}, skipping pedestrian row", pedestrian_row.time);
            outcome.unpaired += 1;
            continue;
        };

        let pedestrian: PedestrianTelemetry = match pedestrian_row.decode() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Malformed pedestrian payload at {}: {}", pedestrian_row.time, err);
                outcome.malformed += 1;
                continue;
            }
        };
        let ego: EgoTelemetry = match ego_row.decode() {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("Malformed ego payload at {}: {}", ego_row.time, err);
                outcome.malformed += 1;
                continue;
            }
        };

        let assessment = evaluator.evaluate(&ego, &pedestrian);
        outcome.records.push(assessment.into_record(
            pedestrian.vehicle_id,
            pedestrian_row.chid,
            pedestrian_row.time.clone(),
        ));
    }

    outcome
}

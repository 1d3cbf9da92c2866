//! Walk a time range in fixed windows, pulling telemetry for each window and
//! evaluating every pedestrian against the ego vehicle.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use tokio::sync::broadcast;
use xwalk_core::{EncounterEvaluator, HistoryResponse, RiskRecord};

use crate::backoff::Backoff;
use crate::config::Config;
use crate::pairing::evaluate_window;
use crate::source::TelemetrySource;

/// Consecutive `[start, end)` windows covering a time range.
#[derive(Debug, Clone, Copy)]
pub struct WindowPlan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub window: chrono::Duration,
}

impl WindowPlan {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime, window: chrono::Duration) -> Self {
        Self { start, end, window }
    }

    /// Window bounds in order. The last window is clipped to `end`.
    pub fn windows(&self) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        let mut windows = Vec::new();
        if self.window <= chrono::Duration::zero() {
            return windows;
        }

        let mut cursor = self.start;
        while cursor < self.end {
            let next = (cursor + self.window).min(self.end);
            windows.push((cursor, next));
            cursor = next;
        }
        windows
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base: Duration,
    pub max: Duration,
    /// Attempts per feed per window, at least one.
    pub max_attempts: u32,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base: Duration::from_millis(config.retry_base_ms),
            max: Duration::from_millis(config.retry_max_ms),
            max_attempts: config.max_fetch_attempts,
        }
    }
}

/// What a loop run produced.
#[derive(Debug, Default)]
pub struct LoopSummary {
    pub records: Vec<RiskRecord>,
    pub windows_evaluated: usize,
    /// Windows where either feed had no rows.
    pub windows_empty: usize,
    /// Windows dropped because the source kept failing.
    pub windows_failed: usize,
    pub unpaired: usize,
    pub malformed: usize,
    /// Set when shutdown arrived before the plan finished.
    pub interrupted: bool,
}

#[derive(Debug, Clone, Copy)]
enum Feed {
    Ego,
    Pedestrians,
}

impl Feed {
    fn label(self) -> &'static str {
        match self {
            Feed::Ego => "ego",
            Feed::Pedestrians => "pedestrian",
        }
    }
}

enum WindowData {
    Ready {
        ego: HistoryResponse,
        pedestrians: HistoryResponse,
    },
    Empty,
}

/// Run the window loop until the plan is exhausted or shutdown fires.
///
/// Records gathered before a shutdown are kept in the summary. One backoff is
/// shared across windows, so a source that keeps failing is retried ever more
/// slowly until it answers again.
pub async fn run_window_loop<S: TelemetrySource>(
    source: &S,
    evaluator: &EncounterEvaluator,
    plan: WindowPlan,
    retry: RetryPolicy,
    mut shutdown: broadcast::Receiver<()>,
) -> LoopSummary {
    let mut summary = LoopSummary::default();
    let mut backoff = Backoff::new(retry.base, retry.max);

    for (start, end) in plan.windows() {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::info!("Window loop shutting down at {}", start);
                summary.interrupted = true;
                break;
            }
            fetched = fetch_window(source, start, end, retry.max_attempts, &mut backoff) => {
                match fetched {
                    Ok(WindowData::Ready { ego, pedestrians }) => {
                        let outcome = evaluate_window(evaluator, &ego, &pedestrians);
                        tracing::info!(
                            "Window {} - {}: {} record(s), {} unpaired, {} malformed",
                            start,
                            end,
                            outcome.records.len(),
                            outcome.unpaired,
                            outcome.malformed
                        );
                        summary.windows_evaluated += 1;
                        summary.unpaired += outcome.unpaired;
                        summary.malformed += outcome.malformed;
                        summary.records.extend(outcome.records);
                    }
                    Ok(WindowData::Empty) => {
                        tracing::info!("Window {} - {}: no telemetry", start, end);
                        summary.windows_empty += 1;
                    }
                    Err(e) => {
                        tracing::error!("Giving up on window {} - {}: {:#}", start, end, e);
                        summary.windows_failed += 1;
                    }
                }
            }
        }
    }

    summary
}

async fn fetch_window<S: TelemetrySource>(
    source: &S,
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_attempts: u32,
    backoff: &mut Backoff,
) -> Result<WindowData> {
    let Some(pedestrians) =
        fetch_with_retry(source, Feed::Pedestrians, start, end, max_attempts, backoff).await?
    else {
        return Ok(WindowData::Empty);
    };
    let Some(ego) = fetch_with_retry(source, Feed::Ego, start, end, max_attempts, backoff).await?
    else {
        return Ok(WindowData::Empty);
    };
    Ok(WindowData::Ready { ego, pedestrians })
}

/// Fetch one feed, retrying errors with backoff.
///
/// Recorded history does not change between requests, so an empty response
/// is final: `Ok(None)` is returned at once. An error is returned only when
/// the last attempt failed.
async fn fetch_with_retry<S: TelemetrySource>(
    source: &S,
    feed: Feed,
    start: NaiveDateTime,
    end: NaiveDateTime,
    max_attempts: u32,
    backoff: &mut Backoff,
) -> Result<Option<HistoryResponse>> {
    let attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let result = match feed {
            Feed::Ego => source.fetch_ego(start, end).await,
            Feed::Pedestrians => source.fetch_pedestrians(start, end).await,
        };

        match result {
            Ok(response) => {
                backoff.reset();
                if response.is_empty() {
                    tracing::debug!("Empty {} response for {} - {}", feed.label(), start, end);
                    return Ok(None);
                }
                return Ok(Some(response));
            }
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                let delay = backoff.fail();
                tracing::warn!(
                    "Fetching {} data for {} - {} failed (attempt {}/{}): {:#}; retrying in {:?}",
                    feed.label(),
                    start,
                    end,
                    attempt,
                    attempts,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

//! Where window telemetry comes from.

use anyhow::Result;
use chrono::NaiveDateTime;
use xwalk_core::HistoryResponse;
use xwalk_data::HistoryClient;

/// A store of recorded ego and pedestrian telemetry, queried by time range.
#[allow(async_fn_in_trait)]
pub trait TelemetrySource {
    async fn fetch_ego(&self, start: NaiveDateTime, end: NaiveDateTime)
        -> Result<HistoryResponse>;

    async fn fetch_pedestrians(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<HistoryResponse>;
}

impl TelemetrySource for HistoryClient {
    async fn fetch_ego(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<HistoryResponse> {
        self.fetch_ego_vehicle_data(start, end).await
    }

    async fn fetch_pedestrians(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<HistoryResponse> {
        self.fetch_pedestrian_data(start, end).await
    }
}

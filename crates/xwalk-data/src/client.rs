//! Telemetry history API HTTP client.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use xwalk_core::HistoryResponse;

/// Timestamp layout the history API expects in its time filter.
const TIME_FILTER_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Bit 2: join the event table and return `EventId` per row.
const FILTER_FLAGS_FETCH_EVENTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// Ego vehicle motion.
    MotionData,
    /// Road users detected around the ego vehicle.
    MotionDetectionData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct TimeFilter {
    start_time: String,
    end_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyFilter {
    property_name: &'static str,
    operator: &'static str,
    filter_values: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct HistoryRequest {
    data_type: DataType,
    filter_flags: u32,
    time_filter: TimeFilter,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    filters: Vec<Vec<PropertyFilter>>,
}

impl HistoryRequest {
    fn new(data_type: DataType, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            data_type,
            filter_flags: FILTER_FLAGS_FETCH_EVENTS,
            time_filter: TimeFilter {
                start_time: start.format(TIME_FILTER_FORMAT).to_string(),
                end_time: end.format(TIME_FILTER_FORMAT).to_string(),
            },
            filters: Vec::new(),
        }
    }

    fn pedestrians_only(mut self) -> Self {
        self.filters = vec![vec![PropertyFilter {
            property_name: "VehicleType",
            operator: "=",
            filter_values: vec!["Pedestrian"],
        }]];
        self
    }
}

/// HTTP client for the telemetry history API.
///
/// Keep windows short (a few seconds); long windows produce erroneous
/// responses upstream.
pub struct HistoryClient {
    pub(crate) client: Client,
    pub(crate) url: String,
}

impl HistoryClient {
    /// Create a new client posting to `url` (the `getHistoryData` endpoint).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch ego vehicle motion records in `[start, end]`.
    pub async fn fetch_ego_vehicle_data(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<HistoryResponse> {
        let request = HistoryRequest::new(DataType::MotionData, start, end);
        self.send_request(&request)
            .await
            .context("Failed to fetch ego vehicle data")
    }

    /// Fetch pedestrian detections in `[start, end]`.
    pub async fn fetch_pedestrian_data(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<HistoryResponse> {
        let request =
            HistoryRequest::new(DataType::MotionDetectionData, start, end).pedestrians_only();
        self.send_request(&request)
            .await
            .context("Failed to fetch pedestrian data")
    }

    async fn send_request(&self, request: &HistoryRequest) -> Result<HistoryResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .context("Failed to send history request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "History request failed: {} {}",
                status,
                body
            ));
        }

        let payload = response
            .json::<HistoryResponse>()
            .await
            .context("Failed to parse history response")?;

        tracing::debug!(
            "History {:?} returned {} row(s)",
            request.data_type,
            payload.response.len()
        );
        Ok(payload)
    }
}

//! Runner configuration from environment.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use xwalk_core::{FrameParams, ReferenceFrame, SafetyRules, VehicleEnvelope};

#[derive(Debug, Clone)]
pub struct Config {
    pub history_url: String,
    pub crossings_path: PathBuf,
    pub output_path: PathBuf,
    /// JSON file with [`FrameParams`]; the Martinez CCTA frame when unset.
    pub frame_path: Option<PathBuf>,
    pub window_secs: u64,
    pub request_timeout_secs: u64,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,
    /// Fetch attempts per window before the window is given up.
    pub max_fetch_attempts: u32,
    pub rules: SafetyRules,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_url: "http://localhost:9080/txvapi/history/getHistoryData".to_string(),
            crossings_path: PathBuf::from("ca_martinez.geojson"),
            output_path: PathBuf::from("result.json"),
            frame_path: None,
            window_secs: 5,
            request_timeout_secs: 10,
            retry_base_ms: 500,
            retry_max_ms: 10_000,
            max_fetch_attempts: 5,
            rules: SafetyRules::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rules = SafetyRules {
            near_crossing_threshold_m: env_or(
                "XWALK_NEAR_CROSSING_M",
                defaults.rules.near_crossing_threshold_m,
            ),
            reaction_time_s: env_or("XWALK_REACTION_TIME_S", defaults.rules.reaction_time_s),
            vehicle: VehicleEnvelope {
                length_m: env_or("XWALK_VEHICLE_LENGTH_M", defaults.rules.vehicle.length_m),
                width_m: env_or("XWALK_VEHICLE_WIDTH_M", defaults.rules.vehicle.width_m),
            },
        };

        Self {
            history_url: env::var("XWALK_HISTORY_URL").unwrap_or(defaults.history_url),
            crossings_path: env::var("XWALK_CROSSINGS")
                .map(PathBuf::from)
                .unwrap_or(defaults.crossings_path),
            output_path: env::var("XWALK_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_path),
            frame_path: env::var("XWALK_FRAME").ok().map(PathBuf::from),
            window_secs: env_or("XWALK_WINDOW_SECS", defaults.window_secs),
            request_timeout_secs: env_or("XWALK_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            retry_base_ms: env_or("XWALK_RETRY_BASE_MS", defaults.retry_base_ms),
            retry_max_ms: env_or("XWALK_RETRY_MAX_MS", defaults.retry_max_ms),
            max_fetch_attempts: env_or("XWALK_MAX_FETCH_ATTEMPTS", defaults.max_fetch_attempts),
            rules,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs.max(1) as i64)
    }

    /// Build the reference frame, from `frame_path` when configured.
    pub fn load_frame(&self) -> Result<ReferenceFrame> {
        let Some(path) = self.frame_path.as_ref() else {
            return Ok(ReferenceFrame::ccta_martinez());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read frame parameters {}", path.display()))?;
        let params: FrameParams = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse frame parameters {}", path.display()))?;
        Ok(ReferenceFrame::new(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = Config::default();
        assert_eq!(config.window_secs, 5);
        assert_eq!(config.rules.near_crossing_threshold_m, 50.0);
        assert_eq!(config.window(), chrono::Duration::seconds(5));
        assert_eq!(config.load_frame().unwrap(), ReferenceFrame::ccta_martinez());
    }

    #[test]
    fn frame_loads_from_file() {
        let path = std::env::temp_dir().join(format!("xwalk-frame-{}.json", std::process::id()));
        std::fs::write(
            &path,
            serde_json::to_string(&FrameParams::from_origin(40.0, -105.0, 1600.0)).unwrap(),
        )
        .unwrap();

        let config = Config {
            frame_path: Some(path.clone()),
            ..Config::default()
        };
        let frame = config.load_frame().unwrap();
        assert_eq!(frame.origin().latitude, 40.0);

        std::fs::remove_file(path).ok();
    }
}

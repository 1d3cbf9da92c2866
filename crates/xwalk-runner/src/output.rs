//! Persist risk records as a JSON array.

use anyhow::{Context, Result};
use std::path::Path;
use xwalk_core::{HistoryResponse, RiskRecord};

pub async fn write_records(path: &Path, records: &[RiskRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_vec_pretty(records).context("Failed to serialize records")?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} record(s) to {}", records.len(), path.display());
    Ok(())
}

/// Read a history API response saved to disk.
pub async fn read_history(path: &Path) -> Result<HistoryResponse> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

//! Crossing polylines from a GeoJSON street map.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use xwalk_core::{CrossingFeature, CrossingId, GeodeticPoint};

/// Value of `properties.type_names` that marks a pedestrian crossing.
const CROSSING_TYPE_NAME: &str = "Crossing";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Value,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl Feature {
    fn is_crossing(&self) -> bool {
        self.properties.get("type_names").and_then(Value::as_str) == Some(CROSSING_TYPE_NAME)
    }

    fn identifier(&self) -> Option<CrossingId> {
        self.properties
            .get("id")
            .or(self.id.as_ref())
            .and_then(crossing_id)
    }
}

/// Integer ids stay numeric; other numbers keep their JSON text.
fn crossing_id(value: &Value) -> Option<CrossingId> {
    match value {
        Value::String(s) => Some(CrossingId::Text(s.clone())),
        Value::Number(n) => Some(
            n.as_i64()
                .map(CrossingId::Number)
                .unwrap_or_else(|| CrossingId::Text(n.to_string())),
        ),
        _ => None,
    }
}

/// Parse `[lon, lat, ...]` positions into geodetic vertices.
fn parse_line(coordinates: &Value) -> Option<Vec<GeodeticPoint>> {
    coordinates
        .as_array()?
        .iter()
        .map(|position| {
            let position = position.as_array()?;
            let lon = position.first()?.as_f64()?;
            let lat = position.get(1)?.as_f64()?;
            Some(GeodeticPoint::new(lat, lon))
        })
        .collect()
}

/// Extract crossing features from a GeoJSON FeatureCollection.
///
/// Only `LineString` features tagged `type_names == "Crossing"` are kept;
/// other crossing geometries and features without an id are skipped.
pub fn parse_crossings(geojson: &str) -> Result<Vec<CrossingFeature>> {
    let collection: FeatureCollection =
        serde_json::from_str(geojson).context("Failed to parse GeoJSON feature collection")?;

    let mut crossings = Vec::new();
    for feature in collection.features.iter().filter(|f| f.is_crossing()) {
        let Some(id) = feature.identifier() else {
            tracing::debug!("Skipping crossing without id");
            continue;
        };
        let Some(geometry) = feature.geometry.as_ref() else {
            tracing::debug!("Skipping crossing {} without geometry", id);
            continue;
        };
        if geometry.kind != "LineString" {
            tracing::debug!("Skipping crossing {} with {} geometry", id, geometry.kind);
            continue;
        }
        let Some(vertices) = parse_line(&geometry.coordinates) else {
            tracing::warn!("Skipping crossing {} with malformed coordinates", id);
            continue;
        };
        crossings.push(CrossingFeature::new(id, vertices));
    }

    Ok(crossings)
}

/// Load and filter crossings from a GeoJSON file.
pub fn load_crossings(path: impl AsRef<Path>) -> Result<Vec<CrossingFeature>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read crossing map {}", path.display()))?;
    let crossings = parse_crossings(&raw)
        .with_context(|| format!("Failed to load crossings from {}", path.display()))?;
    tracing::info!("Loaded {} crossing(s) from {}", crossings.len(), path.display());
    Ok(crossings)
}

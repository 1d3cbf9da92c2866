//! xwalk data - external collaborators of the core engine
//!
//! Fetches recorded telemetry from the history API and loads crossing
//! geometry from GeoJSON street maps.

pub mod client;
pub mod crossings;

pub use client::{DataType, HistoryClient};
pub use crossings::{load_crossings, parse_crossings};

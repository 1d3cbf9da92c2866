//! xwalk runner - batch evaluation of recorded crossing encounters
//!
//! Walks a time range window by window, pairs pedestrian detections with the
//! ego vehicle record at the same instant, and persists one risk record per
//! pedestrian observation.

pub mod backoff;
pub mod config;
pub mod loops;
pub mod output;
pub mod pairing;
pub mod source;

pub use config::Config;
pub use loops::window_loop::{run_window_loop, LoopSummary, RetryPolicy, WindowPlan};
pub use pairing::{evaluate_window, EgoIndex, WindowOutcome};
pub use source::TelemetrySource;

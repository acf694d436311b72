//! Per-tick snapshots for reporting and visualization.

use serde::Serialize;

/// State of a session after one tick.
///
/// `predicted_loc`/`predicted_scale` describe the highest-weight component of
/// the most recently scored forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickSnapshot {
    pub strategy: &'static str,
    pub time: Option<f64>,
    pub location: Option<f64>,
    pub predicted_loc: Option<f64>,
    pub predicted_scale: Option<f64>,
    pub lifetime_score: f64,
    pub recent_score: f64,
    pub n_scores: usize,
}

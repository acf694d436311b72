//! Density scoring for predictive distributions.
//!
//! Scores a [`PredictiveDistribution`](crate::PredictiveDistribution) against
//! the value that was eventually observed:
//!
//! - **pdf_score**: the normal density at the observation (likelihood)
//! - **squared_z_score**: squared standardized error
//! - **custom**: any caller-supplied `(x, loc, scale) -> f64`
//!
//! Mixtures are scored as the weight-weighted sum of per-component metric
//! values. Weights are never renormalized.

mod density;
mod metric;
mod mixture;

pub use density::{pdf_score, squared_z_score};
pub use metric::{MetricFn, ScoringMetric};
pub use mixture::{score_mixture, ComponentScore, MixtureScore};

//! Weighted mixture scoring.

use serde::Serialize;
use tracing::trace;

use super::metric::ScoringMetric;
use crate::errors::Result;
use crate::infra::logging::targets;
use crate::types::PredictiveDistribution;

/// Metric value of a single component, kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScore {
    pub loc: f64,
    pub scale: f64,
    pub weight: f64,
    /// Unweighted metric value of this component
    pub score: f64,
}

/// Result of scoring a predictive distribution at one observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixtureScore {
    /// Σ weightᵢ · metric(x, locᵢ, scaleᵢ)
    pub weighted_score: f64,
    /// Highest-weight component (diagnostic only, never part of the sum).
    ///
    /// The first one wins ties. Zero-weight components never qualify, so an
    /// all-zero mixture has none.
    pub dominant: Option<ComponentScore>,
}

/// Score `prediction` at the observed value `x`.
///
/// # Errors
/// The first component error (e.g. a non-positive scale) aborts the call;
/// no partial sum is returned.
pub fn score_mixture(
    prediction: &PredictiveDistribution,
    x: f64,
    metric: &ScoringMetric,
) -> Result<MixtureScore> {
    let mut weighted_score = 0.0;
    let mut highest_weight = 0.0;
    let mut dominant = None;

    for component in prediction.components() {
        let loc = component.density.loc();
        let scale = component.density.scale();
        let score = metric.evaluate(x, loc, scale)?;

        weighted_score += component.weight * score;

        if component.weight > highest_weight {
            highest_weight = component.weight;
            dominant = Some(ComponentScore {
                loc,
                scale,
                weight: component.weight,
                score,
            });
        }
    }

    trace!(
        target: targets::SCORING,
        metric = metric.name(),
        x,
        weighted_score,
        "Scored prediction"
    );

    Ok(MixtureScore {
        weighted_score,
        dominant,
    })
}

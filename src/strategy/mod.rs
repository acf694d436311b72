//! Forecast strategies.
//!
//! A strategy ingests observations one at a time and, once warmed up, emits a
//! [`PredictiveDistribution`] for the value one horizon ahead. Strategies that
//! learn from their own one-step-delayed pairs own a private
//! [`Quarantine`](crate::Quarantine) rather than inheriting one.
//!
//! Shipped implementations:
//!
//! - [`EwmaVarianceStrategy`]: core/tail Gaussian mixture around the last value
//! - [`LastValueStrategy`]: fixed-width normal around the previous matured value
//! - [`ConstantStrategy`]: always the same normal

mod baseline;
mod ewma_variance;
mod fading;

pub use baseline::{ConstantStrategy, LastValueStrategy};
pub use ewma_variance::{EwmaVarianceConfig, EwmaVarianceStrategy};
pub use fading::FadingVariance;

use serde::Serialize;

use crate::types::{Observation, PredictiveDistribution};

/// Running evaluation metrics handed back to a strategy on ingest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunningMetrics {
    /// Mean log score over all matched forecasts
    pub lifetime_score: f64,
    /// Mean log score over the rolling window
    pub recent_score: f64,
}

/// Trait for forecast strategies.
///
/// Observation times are expected to be non-decreasing; what a strategy does
/// otherwise is up to the strategy.
pub trait ForecastStrategy: Send {
    /// Ingest one observation.
    ///
    /// `metrics` is `Some` once the evaluating session has scored at least one
    /// forecast. Strategies may use it to re-enter warm-up on poor performance.
    fn ingest(&mut self, observation: &Observation, metrics: Option<&RunningMetrics>);

    /// Forecast for `horizon` ahead of the latest observation.
    ///
    /// Returns `None` while warming up.
    fn forecast(&self) -> Option<PredictiveDistribution>;

    /// Fixed lead time of this strategy's forecasts.
    fn horizon(&self) -> f64;

    /// Number of observations counted toward warm-up.
    fn tick_count(&self) -> usize;

    /// Get the name of this strategy for logging.
    fn name(&self) -> &'static str;
}

/// Blanket implementation for Box<dyn ForecastStrategy>.
impl ForecastStrategy for Box<dyn ForecastStrategy> {
    fn ingest(&mut self, observation: &Observation, metrics: Option<&RunningMetrics>) {
        (**self).ingest(observation, metrics)
    }

    fn forecast(&self) -> Option<PredictiveDistribution> {
        (**self).forecast()
    }

    fn horizon(&self) -> f64 {
        (**self).horizon()
    }

    fn tick_count(&self) -> usize {
        (**self).tick_count()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

//! Baseline strategies used as benchmark references.

use super::{ForecastStrategy, RunningMetrics};
use crate::errors::{Error, Result};
use crate::quarantine::Quarantine;
use crate::types::{Observation, PredictiveDistribution};

/// Predicts `N(previous matured location, scale²)`.
///
/// "Previous" is the location observed one horizon earlier, obtained from a
/// private quarantine. Withholds forecasts until such a location exists.
#[derive(Debug, Clone)]
pub struct LastValueStrategy {
    scale: f64,
    quarantine: Quarantine<f64>,
    previous_location: Option<f64>,
    tick_count: usize,
}

impl LastValueStrategy {
    /// # Errors
    /// `InvalidHorizon` for a bad horizon, `InvalidParameter` for `scale <= 0`.
    pub fn new(horizon: f64, scale: f64) -> Result<Self> {
        if !(scale > 0.0) {
            return Err(Error::InvalidParameter {
                name: "scale",
                value: scale,
            });
        }
        Ok(Self {
            scale,
            quarantine: Quarantine::new(horizon)?,
            previous_location: None,
            tick_count: 0,
        })
    }
}

impl ForecastStrategy for LastValueStrategy {
    fn ingest(&mut self, observation: &Observation, _metrics: Option<&RunningMetrics>) {
        self.quarantine.enqueue(observation.time, observation.location);
        if let Some(prev) = self.quarantine.release_up_to(observation.time) {
            self.previous_location = Some(prev.payload);
        }
        self.tick_count += 1;
    }

    fn forecast(&self) -> Option<PredictiveDistribution> {
        self.previous_location
            .map(|loc| PredictiveDistribution::normal(loc, self.scale))
    }

    fn horizon(&self) -> f64 {
        self.quarantine.horizon()
    }

    fn tick_count(&self) -> usize {
        self.tick_count
    }

    fn name(&self) -> &'static str {
        "LastValue"
    }
}

/// Always predicts the same normal distribution.
#[derive(Debug, Clone)]
pub struct ConstantStrategy {
    horizon: f64,
    loc: f64,
    scale: f64,
    tick_count: usize,
}

impl ConstantStrategy {
    /// The scale is not validated here, so degenerate forecasts can be used
    /// to exercise scoring errors.
    pub fn new(horizon: f64, loc: f64, scale: f64) -> Self {
        Self {
            horizon,
            loc,
            scale,
            tick_count: 0,
        }
    }
}

impl ForecastStrategy for ConstantStrategy {
    fn ingest(&mut self, _observation: &Observation, _metrics: Option<&RunningMetrics>) {
        self.tick_count += 1;
    }

    fn forecast(&self) -> Option<PredictiveDistribution> {
        Some(PredictiveDistribution::normal(self.loc, self.scale))
    }

    fn horizon(&self) -> f64 {
        self.horizon
    }

    fn tick_count(&self) -> usize {
        self.tick_count
    }

    fn name(&self) -> &'static str {
        "Constant"
    }
}

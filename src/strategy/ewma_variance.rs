//! Core/tail Gaussian mixture strategy.
//!
//! Tracks the distribution of one-horizon changes `dx = x(t) - x(t - h)` with
//! two fading-variance estimators and forecasts a two-component normal
//! mixture centered at the latest observed value:
//!
//! - **core**: fed `dx` winsorized to ±2σ_core, so jumps don't inflate it
//! - **tail**: fed `2·dx`, giving a wide component that absorbs jumps
//!
//! The mixture is weighted `[core_weight, 1 - core_weight]` (0.95/0.05 by
//! default).

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use super::fading::FadingVariance;
use super::{ForecastStrategy, RunningMetrics};
use crate::consts::MIN_SCALE;
use crate::errors::{Error, Result};
use crate::infra::logging::targets;
use crate::quarantine::Quarantine;
use crate::types::{Density, Observation, PredictiveDistribution};

/// Configuration for [`EwmaVarianceStrategy`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EwmaVarianceConfig {
    /// Lead time of forecasts, in observation-time units
    #[serde(default = "default_horizon")]
    pub horizon: f64,

    /// Weight of each new change in the variance estimates.
    /// Default: 1e-4 (long memory)
    #[serde(default = "default_fading_factor")]
    pub fading_factor: f64,

    /// Ticks to withhold forecasts after start (or after a reset).
    /// Default: 0
    #[serde(default)]
    pub warmup: usize,

    /// Mixture weight of the core component; the tail gets the rest.
    /// Default: 0.95
    #[serde(default = "default_core_weight")]
    pub core_weight: f64,

    /// Re-enter warm-up when the session's recent score drops below this.
    /// Re-arms once the recent score recovers. Default: disabled
    #[serde(default)]
    pub reset_threshold: Option<f64>,
}

fn default_horizon() -> f64 {
    10.0
}

fn default_fading_factor() -> f64 {
    1e-4
}

fn default_core_weight() -> f64 {
    0.95
}

impl Default for EwmaVarianceConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            fading_factor: default_fading_factor(),
            warmup: 0,
            core_weight: default_core_weight(),
            reset_threshold: None,
        }
    }
}

impl EwmaVarianceConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(format!(
                "horizon must be finite and >= 0.0, got {}",
                self.horizon
            ));
        }
        if !(self.fading_factor > 0.0 && self.fading_factor <= 1.0) {
            return Err(format!(
                "fading_factor must be in (0.0, 1.0], got {}",
                self.fading_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.core_weight) {
            return Err(format!(
                "core_weight must be in [0.0, 1.0], got {}",
                self.core_weight
            ));
        }
        Ok(())
    }
}

/// Two-component normal mixture around the latest value.
#[derive(Debug, Clone)]
pub struct EwmaVarianceStrategy {
    config: EwmaVarianceConfig,
    /// Own delayed locations, for forming one-horizon changes
    quarantine: Quarantine<f64>,
    current_location: Option<f64>,
    core: FadingVariance,
    tail: FadingVariance,
    tick_count: usize,
    reset_armed: bool,
}

impl EwmaVarianceStrategy {
    /// Create a strategy from config.
    ///
    /// # Errors
    /// `InvalidHorizon` if the configured horizon is negative or not finite,
    /// `InvalidConfig` if any other parameter is out of range.
    pub fn new(config: EwmaVarianceConfig) -> Result<Self> {
        let quarantine = Quarantine::new(config.horizon)?;
        config.validate().map_err(Error::InvalidConfig)?;
        Ok(Self {
            core: FadingVariance::new(config.fading_factor),
            tail: FadingVariance::new(config.fading_factor),
            config,
            quarantine,
            current_location: None,
            tick_count: 0,
            reset_armed: true,
        })
    }

    /// Create with defaults apart from the horizon.
    pub fn with_horizon(horizon: f64) -> Result<Self> {
        Self::new(EwmaVarianceConfig {
            horizon,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &EwmaVarianceConfig {
        &self.config
    }

    /// Standard deviation of the core component as it would be forecast.
    pub fn core_scale(&self) -> f64 {
        component_scale(&self.core)
    }

    /// Standard deviation of the tail component as it would be forecast.
    pub fn tail_scale(&self) -> f64 {
        component_scale(&self.tail)
    }

    /// Number of one-horizon changes learned from.
    pub fn n_changes(&self) -> usize {
        self.core.count()
    }

    fn maybe_reset(&mut self, metrics: Option<&RunningMetrics>) {
        let (Some(threshold), Some(metrics)) = (self.config.reset_threshold, metrics) else {
            return;
        };

        if metrics.recent_score >= threshold {
            self.reset_armed = true;
            return;
        }

        if self.reset_armed && self.tick_count >= self.config.warmup {
            info!(
                target: targets::STRATEGY,
                recent_score = metrics.recent_score,
                threshold,
                warmup = self.config.warmup,
                "Recent score below threshold, re-entering warm-up"
            );
            self.tick_count = 0;
            self.reset_armed = false;
        }
    }
}

fn component_scale(estimator: &FadingVariance) -> f64 {
    estimator.std().unwrap_or(1.0).max(MIN_SCALE)
}

impl ForecastStrategy for EwmaVarianceStrategy {
    fn ingest(&mut self, observation: &Observation, metrics: Option<&RunningMetrics>) {
        self.maybe_reset(metrics);

        let x = observation.location;
        self.quarantine.enqueue(observation.time, x);
        self.current_location = Some(x);

        if let Some(prev) = self.quarantine.release_up_to(observation.time) {
            let dx = x - prev.payload;

            let threshold = 2.0 * self.core.variance().unwrap_or(1.0).sqrt();
            let clipped = if threshold > 0.0 {
                dx.clamp(-threshold, threshold)
            } else {
                dx
            };
            self.core.update(clipped);
            self.tail.update(2.0 * dx);

            trace!(
                target: targets::STRATEGY,
                dx,
                clipped,
                core_scale = self.core_scale(),
                tail_scale = self.tail_scale(),
                "Updated change estimators"
            );
        }

        self.tick_count += 1;
    }

    fn forecast(&self) -> Option<PredictiveDistribution> {
        if self.tick_count < self.config.warmup {
            return None;
        }
        let loc = self.current_location?;

        Some(PredictiveDistribution::mixture([
            (self.config.core_weight, Density::normal(loc, self.core_scale())),
            (
                1.0 - self.config.core_weight,
                Density::normal(loc, self.tail_scale()),
            ),
        ]))
    }

    fn horizon(&self) -> f64 {
        self.config.horizon
    }

    fn tick_count(&self) -> usize {
        self.tick_count
    }

    fn name(&self) -> &'static str {
        "EwmaVariance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(t: f64, x: f64) -> Observation {
        Observation::new(t, x)
    }

    #[test]
    fn test_config_validation() {
        assert!(EwmaVarianceConfig::default().validate().is_ok());

        let bad = EwmaVarianceConfig {
            fading_factor: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = EwmaVarianceConfig {
            core_weight: 1.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        assert!(EwmaVarianceStrategy::with_horizon(-1.0).is_err());
    }

    #[test]
    fn test_new_rejects_out_of_range_config() {
        let result = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            core_weight: 1.5,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        let result = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            fading_factor: 0.0,
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));

        assert!(matches!(
            EwmaVarianceStrategy::with_horizon(f64::NAN),
            Err(Error::InvalidHorizon(_))
        ));
    }

    #[test]
    fn test_no_forecast_before_first_observation() {
        let strategy = EwmaVarianceStrategy::with_horizon(1.0).unwrap();
        assert!(strategy.forecast().is_none());
    }

    #[test]
    fn test_warmup_withholds_forecasts() {
        let mut strategy = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            horizon: 1.0,
            warmup: 3,
            ..Default::default()
        })
        .unwrap();

        for t in 0..2 {
            strategy.ingest(&obs(t as f64, 0.0), None);
            assert!(strategy.forecast().is_none());
        }
        strategy.ingest(&obs(2.0, 0.0), None);
        assert_eq!(strategy.tick_count(), 3);
        assert!(strategy.forecast().is_some());
    }

    #[test]
    fn test_forecast_shape() {
        let mut strategy = EwmaVarianceStrategy::with_horizon(1.0).unwrap();
        strategy.ingest(&obs(0.0, 4.0), None);

        let forecast = strategy.forecast().unwrap();
        let comps: Vec<_> = forecast.components().collect();
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].weight, 0.95);
        assert!((comps[1].weight - 0.05).abs() < 1e-12);
        assert!(comps.iter().all(|c| c.density.loc() == 4.0));
        // No changes seen yet: unit scale fallback
        assert!(comps.iter().all(|c| c.density.scale() == 1.0));
    }

    #[test]
    fn test_flat_series_clamps_scale() {
        let mut strategy = EwmaVarianceStrategy::with_horizon(1.0).unwrap();
        for t in 0..20 {
            strategy.ingest(&obs(t as f64, 1.0), None);
        }
        assert_eq!(strategy.core_scale(), MIN_SCALE);
        assert_eq!(strategy.n_changes(), 19);
    }

    #[test]
    fn test_tail_wider_than_core_after_jump() {
        let mut strategy = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            horizon: 1.0,
            fading_factor: 0.05,
            ..Default::default()
        })
        .unwrap();

        let mut x = 0.0;
        for t in 0..400 {
            x += if t % 2 == 0 { 0.5 } else { -0.5 };
            if t == 300 {
                x += 50.0;
            }
            strategy.ingest(&obs(t as f64, x), None);
        }
        assert!(strategy.tail_scale() > strategy.core_scale());
    }

    #[test]
    fn test_reset_on_poor_recent_score() {
        let mut strategy = EwmaVarianceStrategy::new(EwmaVarianceConfig {
            horizon: 1.0,
            warmup: 2,
            reset_threshold: Some(-5.0),
            ..Default::default()
        })
        .unwrap();
        for t in 0..5 {
            strategy.ingest(&obs(t as f64, 0.0), None);
        }
        assert!(strategy.forecast().is_some());

        let poor = RunningMetrics {
            lifetime_score: -1.0,
            recent_score: -10.0,
        };
        strategy.ingest(&obs(5.0, 0.0), Some(&poor));
        assert_eq!(strategy.tick_count(), 1);
        assert!(strategy.forecast().is_none());

        // Disarmed until the score recovers
        strategy.ingest(&obs(6.0, 0.0), Some(&poor));
        strategy.ingest(&obs(7.0, 0.0), Some(&poor));
        assert_eq!(strategy.tick_count(), 3);
        assert!(strategy.forecast().is_some());
    }

    #[test]
    fn test_boxed_strategy() {
        let mut boxed: Box<dyn ForecastStrategy> =
            Box::new(EwmaVarianceStrategy::with_horizon(2.0).unwrap());
        boxed.ingest(&obs(0.0, 1.0), None);
        assert_eq!(boxed.horizon(), 2.0);
        assert_eq!(boxed.tick_count(), 1);
        assert_eq!(boxed.name(), "EwmaVariance");
    }
}

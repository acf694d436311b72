//! Delayed-validation session for a single strategy.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::score_tracker::LogScoreTracker;
use super::snapshot::TickSnapshot;
use crate::consts::DEFAULT_ROLLING_CAPACITY;
use crate::errors::Result;
use crate::infra::logging::targets;
use crate::quarantine::Quarantine;
use crate::scoring::{score_mixture, ComponentScore, ScoringMetric};
use crate::strategy::{ForecastStrategy, RunningMetrics};
use crate::types::{Observation, PredictiveDistribution};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Strategy tick count has not yet passed the cutoff
    WarmingUp,
    /// Strategy tick count is past the cutoff
    Active,
}

/// Configuration for an [`EvaluationSession`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Capacity of the rolling score window.
    /// Default: 100
    #[serde(default = "default_rolling_capacity")]
    pub rolling_capacity: usize,

    /// Strategy tick count the session must pass to become `Active`.
    /// Default: 0 (active after the first tick)
    #[serde(default)]
    pub warmup_cutoff: usize,

    /// Builtin scoring metric name.
    /// Default: "pdf_score"
    #[serde(default = "default_metric")]
    pub metric: String,
}

fn default_rolling_capacity() -> usize {
    DEFAULT_ROLLING_CAPACITY
}

fn default_metric() -> String {
    "pdf_score".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rolling_capacity: default_rolling_capacity(),
            warmup_cutoff: 0,
            metric: default_metric(),
        }
    }
}

impl SessionConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.rolling_capacity == 0 {
            return Err("rolling_capacity must be > 0".to_string());
        }
        ScoringMetric::from_name(&self.metric).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Pairs each forecast with the observation one horizon later and scores it.
///
/// Per tick:
/// 1. the strategy ingests the observation and forecasts
/// 2. the forecast (or `None` during warm-up) is quarantined for one horizon
/// 3. the freshest matured forecast, if any, is scored against the
///    observation that just arrived
///
/// The first score therefore needs at least one horizon of history plus the
/// strategy's own warm-up.
#[derive(Debug)]
pub struct EvaluationSession<S> {
    strategy: S,
    config: SessionConfig,
    metric: ScoringMetric,
    quarantine: Quarantine<Option<PredictiveDistribution>>,
    scores: LogScoreTracker,
    state: SessionState,
    ticks: usize,
    last_observation: Option<(f64, f64)>,
    last_prediction: Option<ComponentScore>,
}

impl<S: ForecastStrategy> EvaluationSession<S> {
    /// Create a session with default config.
    pub fn new(strategy: S) -> Result<Self> {
        Self::with_config(strategy, SessionConfig::default())
    }

    /// Create a session. The quarantine horizon is taken from the strategy.
    ///
    /// # Errors
    /// `UnsupportedMetric` for an unknown metric name, `InvalidHorizon` if the
    /// strategy reports a bad horizon.
    pub fn with_config(strategy: S, config: SessionConfig) -> Result<Self> {
        let metric = ScoringMetric::from_name(&config.metric)?;
        let quarantine = Quarantine::new(strategy.horizon())?;
        Ok(Self {
            scores: LogScoreTracker::new(config.rolling_capacity),
            strategy,
            config,
            metric,
            quarantine,
            state: SessionState::WarmingUp,
            ticks: 0,
            last_observation: None,
            last_prediction: None,
        })
    }

    /// Replace the scoring metric (e.g. with a custom function).
    pub fn with_metric(mut self, metric: ScoringMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Advance one observation.
    ///
    /// Returns the weighted score when a matured forecast was matched, `None`
    /// otherwise (nothing matured yet, or the matured slot was a warm-up).
    ///
    /// # Errors
    /// Scoring errors from an invalid forecast propagate. The matured entry
    /// has already been released at that point, so the quarantine stays
    /// consistent and the next tick proceeds normally.
    pub fn tick_and_predict(&mut self, observation: &Observation) -> Result<Option<f64>> {
        let metrics = (!self.scores.is_empty()).then(|| self.running_metrics());
        self.strategy.ingest(observation, metrics.as_ref());
        let prediction = self.strategy.forecast();

        self.ticks += 1;
        self.last_observation = Some((observation.time, observation.location));
        self.update_state();

        self.quarantine.enqueue(observation.time, prediction);
        let Some(released) = self.quarantine.release_up_to(observation.time) else {
            return Ok(None);
        };
        let Some(matured) = released.payload else {
            return Ok(None);
        };

        let result = score_mixture(&matured, observation.location, &self.metric)?;
        self.scores.record(result.weighted_score);
        if let Some(dominant) = result.dominant {
            self.last_prediction = Some(dominant);
        }

        debug!(
            target: targets::SESSION,
            strategy = self.strategy.name(),
            time = observation.time,
            location = observation.location,
            score = result.weighted_score,
            n_scores = self.scores.n_samples(),
            "Scored matured forecast"
        );

        Ok(Some(result.weighted_score))
    }

    fn update_state(&mut self) {
        let next = if self.strategy.tick_count() > self.config.warmup_cutoff {
            SessionState::Active
        } else {
            SessionState::WarmingUp
        };
        if next != self.state {
            info!(
                target: targets::SESSION,
                strategy = self.strategy.name(),
                from = ?self.state,
                to = ?next,
                tick_count = self.strategy.tick_count(),
                "Session state changed"
            );
            self.state = next;
        }
    }

    /// Mean log score over all matched forecasts (0.0 when none).
    pub fn lifetime_score(&self) -> f64 {
        self.scores.lifetime_score()
    }

    /// Mean log score over the rolling window (0.0 when none).
    pub fn recent_score(&self) -> f64 {
        self.scores.recent_score()
    }

    /// Median raw score over all matched forecasts.
    pub fn median_density(&self) -> Option<f64> {
        self.scores.median_score()
    }

    pub fn running_metrics(&self) -> RunningMetrics {
        RunningMetrics {
            lifetime_score: self.lifetime_score(),
            recent_score: self.recent_score(),
        }
    }

    /// Snapshot for reporting.
    pub fn snapshot(&self) -> TickSnapshot {
        let (lifetime_score, recent_score) = if self.scores.is_empty() {
            (0.0, 0.0)
        } else {
            (self.lifetime_score(), self.recent_score())
        };
        TickSnapshot {
            strategy: self.strategy.name(),
            time: self.last_observation.map(|(t, _)| t),
            location: self.last_observation.map(|(_, x)| x),
            predicted_loc: self.last_prediction.map(|p| p.loc),
            predicted_scale: self.last_prediction.map(|p| p.scale),
            lifetime_score,
            recent_score,
            n_scores: self.scores.n_samples(),
        }
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Observations processed.
    #[inline]
    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Forecasts matched and scored.
    #[inline]
    pub fn score_count(&self) -> usize {
        self.scores.n_samples()
    }

    pub fn recent_window_len(&self) -> usize {
        self.scores.window_len()
    }

    /// Forecasts waiting for their horizon to elapse.
    pub fn pending_forecasts(&self) -> usize {
        self.quarantine.len()
    }

    pub fn horizon(&self) -> f64 {
        self.quarantine.horizon()
    }

    pub fn metric(&self) -> &ScoringMetric {
        &self.metric
    }

    pub fn scores(&self) -> &LogScoreTracker {
        &self.scores
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut S {
        &mut self.strategy
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

//! Log-score accumulation over lifetime and rolling windows.
//!
//! Each matched forecast contributes a raw score `s` (the predicted density
//! at the realized value). Aggregates are mean log scores:
//!
//! ```text
//! score = mean(ln(ε + sᵢ)),   ε = 1e-10
//! ```
//!
//! The ε floor caps the penalty of a zero-density miss at ln(1e-10) ≈ -23.
//! Higher is better.

use std::collections::VecDeque;

use tracing::debug;

use crate::consts::LOG_SCORE_EPSILON;
use crate::infra::logging::targets;

#[inline]
fn log_score(score: f64) -> f64 {
    (LOG_SCORE_EPSILON + score).ln()
}

/// Lifetime and rolling mean-log-score tracker.
///
/// The lifetime sequence is unbounded: one `f64` per matched forecast for as
/// long as the session runs. The rolling window is FIFO with fixed capacity.
#[derive(Debug, Clone)]
pub struct LogScoreTracker {
    /// Raw scores since creation
    lifetime: Vec<f64>,
    /// Running sum of log scores over `lifetime`
    lifetime_log_sum: f64,
    /// Maximum number of samples in the window
    window_size: usize,
    /// Log scores in the rolling window
    window: VecDeque<f64>,
    /// Running sum of `window`
    window_log_sum: f64,
}

impl LogScoreTracker {
    /// Create a tracker with the given rolling window size (at least 1).
    pub fn new(window_size: usize) -> Self {
        Self {
            lifetime: Vec::new(),
            lifetime_log_sum: 0.0,
            window_size: window_size.max(1),
            window: VecDeque::with_capacity(window_size.clamp(1, 10_000)),
            window_log_sum: 0.0,
        }
    }

    /// Record one raw score.
    pub fn record(&mut self, score: f64) {
        let logged = log_score(score);

        self.lifetime.push(score);
        self.lifetime_log_sum += logged;

        // Evict oldest if at capacity
        if self.window.len() >= self.window_size {
            if let Some(old) = self.window.pop_front() {
                self.window_log_sum -= old;
            }
        }
        self.window.push_back(logged);
        self.window_log_sum += logged;

        // An infinite entry leaves NaN behind once evicted
        if !self.window_log_sum.is_finite() {
            self.window_log_sum = self.window.iter().sum();
        }
    }

    /// Mean log score over every recorded score.
    ///
    /// Returns 0.0 if no samples have been recorded.
    pub fn lifetime_score(&self) -> f64 {
        if self.lifetime.is_empty() {
            debug!(target: targets::SESSION, "No scores to average");
            return 0.0;
        }
        self.lifetime_log_sum / self.lifetime.len() as f64
    }

    /// Mean log score over the rolling window.
    ///
    /// Returns 0.0 if no samples have been recorded.
    pub fn recent_score(&self) -> f64 {
        if self.window.is_empty() {
            debug!(target: targets::SESSION, "No recent scores to average");
            return 0.0;
        }
        self.window_log_sum / self.window.len() as f64
    }

    /// Median raw score over the lifetime, if any.
    pub fn median_score(&self) -> Option<f64> {
        if self.lifetime.is_empty() {
            return None;
        }
        let mut sorted = self.lifetime.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Raw scores in recording order.
    pub fn lifetime_scores(&self) -> &[f64] {
        &self.lifetime
    }

    /// Most recent raw score.
    pub fn last_score(&self) -> Option<f64> {
        self.lifetime.last().copied()
    }

    /// Number of scores recorded since creation.
    pub fn n_samples(&self) -> usize {
        self.lifetime.len()
    }

    /// Number of log scores currently in the rolling window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn is_empty(&self) -> bool {
        self.lifetime.is_empty()
    }

    /// Clear all samples.
    pub fn clear(&mut self) {
        self.lifetime.clear();
        self.lifetime_log_sum = 0.0;
        self.window.clear();
        self.window_log_sum = 0.0;
    }
}

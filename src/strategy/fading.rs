//! Fading-memory mean/variance estimator.
//!
//! Each update moves the mean by a fraction `f` of the innovation and
//! discounts the accumulated variance by `(1 - f)`:
//!
//! ```text
//! δ    = x - mean
//! mean = mean + f·δ
//! var  = (1 - f)·(var + f·δ²)
//! ```
//!
//! The first observation seeds the mean with zero variance.

/// Exponentially fading mean and variance of a scalar stream.
#[derive(Debug, Clone)]
pub struct FadingVariance {
    fading_factor: f64,
    mean: f64,
    variance: f64,
    count: usize,
}

impl FadingVariance {
    /// Create an empty estimator.
    ///
    /// # Arguments
    /// * `fading_factor` - Weight of each new observation, clamped to (0, 1]
    pub fn new(fading_factor: f64) -> Self {
        Self {
            fading_factor: fading_factor.clamp(f64::MIN_POSITIVE, 1.0),
            mean: 0.0,
            variance: 0.0,
            count: 0,
        }
    }

    /// Update with a new observation.
    pub fn update(&mut self, x: f64) {
        if self.count == 0 {
            self.mean = x;
            self.variance = 0.0;
        } else {
            let f = self.fading_factor;
            let delta = x - self.mean;
            self.mean += f * delta;
            self.variance = (1.0 - f) * (self.variance + f * delta * delta);
        }
        self.count += 1;
    }

    /// Current mean, or `None` before the first update.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Current variance, or `None` before the first update.
    pub fn variance(&self) -> Option<f64> {
        (self.count > 0).then_some(self.variance)
    }

    /// Current standard deviation, or `None` before the first update.
    pub fn std(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn fading_factor(&self) -> f64 {
        self.fading_factor
    }

    /// Reset to the empty state.
    pub fn reset(&mut self) {
        self.mean = 0.0;
        self.variance = 0.0;
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let est = FadingVariance::new(0.1);
        assert!(est.mean().is_none());
        assert!(est.variance().is_none());
        assert_eq!(est.count(), 0);
    }

    #[test]
    fn test_first_value_seeds_mean() {
        let mut est = FadingVariance::new(0.1);
        est.update(3.0);
        assert_eq!(est.mean(), Some(3.0));
        assert_eq!(est.variance(), Some(0.0));
    }

    #[test]
    fn test_alternating_variance() {
        // Values 0, 1, 0, 1, ... have variance 0.25
        let mut est = FadingVariance::new(0.05);
        for i in 0..2000 {
            est.update((i % 2) as f64);
        }
        assert!((est.mean().unwrap() - 0.5).abs() < 0.05);
        assert!((est.variance().unwrap() - 0.25).abs() < 0.03);
    }

    #[test]
    fn test_constant_stream_has_zero_variance() {
        let mut est = FadingVariance::new(0.2);
        for _ in 0..100 {
            est.update(7.0);
        }
        assert_eq!(est.mean(), Some(7.0));
        assert_eq!(est.variance(), Some(0.0));
    }

    #[test]
    fn test_fading_factor_clamped() {
        assert_eq!(FadingVariance::new(5.0).fading_factor(), 1.0);
        assert!(FadingVariance::new(-1.0).fading_factor() > 0.0);
    }

    #[test]
    fn test_reset() {
        let mut est = FadingVariance::new(0.1);
        est.update(1.0);
        est.update(2.0);
        est.reset();
        assert_eq!(est.count(), 0);
        assert!(est.std().is_none());
    }
}

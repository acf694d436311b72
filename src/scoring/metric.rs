//! Scoring metric selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::density::{check_scale, pdf_score, squared_z_score};
use crate::errors::{Error, Result};

/// Caller-supplied metric: `(observed, loc, scale) -> score`.
pub type MetricFn = Arc<dyn Fn(f64, f64, f64) -> f64 + Send + Sync>;

/// Per-component scoring metric.
#[derive(Clone, Default)]
pub enum ScoringMetric {
    /// Normal density at the observation (likelihood)
    #[default]
    PdfScore,
    /// Squared standardized error
    SquaredZScore,
    /// Caller-supplied function
    Custom(MetricFn),
}

impl ScoringMetric {
    /// Resolve a builtin metric by name.
    ///
    /// Accepts `pdf_score`/`pdf`/`likelihood` and `z_score`/`squared_z_score`.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "pdf_score" | "pdf" | "likelihood" => Ok(Self::PdfScore),
            "z_score" | "squared_z_score" => Ok(Self::SquaredZScore),
            _ => Err(Error::UnsupportedMetric(name.to_string())),
        }
    }

    /// Wrap a closure as a metric.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Evaluate the metric for one component.
    ///
    /// The scale is validated for every variant, custom ones included.
    pub fn evaluate(&self, x: f64, loc: f64, scale: f64) -> Result<f64> {
        match self {
            Self::PdfScore => pdf_score(x, loc, scale),
            Self::SquaredZScore => squared_z_score(x, loc, scale),
            Self::Custom(f) => {
                check_scale(scale)?;
                Ok(f(x, loc, scale))
            }
        }
    }

    /// Get the name of this metric for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PdfScore => "pdf_score",
            Self::SquaredZScore => "z_score",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ScoringMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScoringMetric").field(&self.name()).finish()
    }
}

impl FromStr for ScoringMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

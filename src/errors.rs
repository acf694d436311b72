use thiserror::Error;

/// Main crate error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A density parameter violated its domain (e.g. non-positive scale)
    #[error("Invalid parameter: {name} must be positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Metric name did not resolve to a builtin scoring metric
    #[error("Unsupported metric: {0}")]
    UnsupportedMetric(String),

    /// Forecast horizon must be finite and non-negative
    #[error("Invalid horizon: {0} (must be finite and >= 0)")]
    InvalidHorizon(f64),

    /// A config section failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Malformed observation record
    #[error("Parse error: {0}")]
    Parse(String),

    /// Underlying reader failed
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

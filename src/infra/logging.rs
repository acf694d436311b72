//! Logging setup for the `arena` binary.
//!
//! Library code only emits `tracing` events. Installing a subscriber is the
//! caller's job; `init_logging` is the one the binary uses.
//!
//! # Component Targets
//!
//! | Target | Description |
//! |--------|-------------|
//! | `forecast_arena::scoring` | Per-component mixture scores (trace) |
//! | `forecast_arena::quarantine` | Matured forecast releases (trace) |
//! | `forecast_arena::strategy` | Warm-up resets, estimator updates |
//! | `forecast_arena::session` | Ticks, scores, state changes |
//! | `forecast_arena::harness` | Periodic comparison reports |
//!
//! ```bash
//! # Per-tick session detail, everything else at info
//! RUST_LOG=info,forecast_arena::session=debug arena run
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable with colors
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
    /// Compact single-line format
    Compact,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,

    /// Format for stdout
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for daily-rotated JSON logs, in addition to stdout
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Single log file; both stdout and file use JSON.
    /// Ignored when `log_dir` is set.
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_dir: None,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// JSON stdout plus rotated files under `log_dir`.
    pub fn production(log_dir: PathBuf) -> Self {
        Self {
            format: LogFormat::Json,
            log_dir: Some(log_dir),
            ..Default::default()
        }
    }

    pub fn with_log_file(log_file: String) -> Self {
        Self {
            log_file: Some(log_file),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("invalid log level '{}': {}", self.level, e))
    }

    fn filter(&self, env_filter_override: Option<&str>) -> EnvFilter {
        match env_filter_override {
            Some(filter) => EnvFilter::new(filter),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level)),
        }
    }
}

/// Install the global subscriber described by `config`.
///
/// The returned guard, if any, must be held until exit so buffered file
/// output is flushed.
///
/// ```ignore
/// let _guard = init_logging(&LogConfig::default(), Some("debug"))?;
/// ```
pub fn init_logging(
    config: &LogConfig,
    env_filter_override: Option<&str>,
) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = config.filter(env_filter_override);

    if let Some(ref log_dir) = config.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "arena.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .json()
            .with_filter(config.filter(env_filter_override));

        match config.format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(fmt::layer().json().with_filter(filter))
                    .try_init()?;
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(fmt::layer().compact().with_filter(filter))
                    .try_init()?;
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(fmt::layer().with_target(false).with_filter(filter))
                    .try_init()?;
            }
        }

        eprintln!("Logging to directory: {}", log_dir.display());
        return Ok(Some(guard));
    }

    if let Some(ref log_file) = config.log_file {
        let file = std::fs::File::create(log_file)?;
        let file = std::sync::Mutex::new(file);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .with(fmt::layer().with_writer(file).with_ansi(false).json())
            .try_init()?;

        eprintln!("Logging to file: {log_file}");
        return Ok(None);
    }

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_filter(filter))
                .try_init()?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(fmt::layer().compact().with_filter(filter))
                .try_init()?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(false).with_filter(filter))
                .try_init()?;
        }
    }

    Ok(None)
}

/// Log target constants.
///
/// ```ignore
/// tracing::debug!(target: targets::SESSION, ticks, "Tick");
/// ```
pub mod targets {
    pub const SCORING: &str = "forecast_arena::scoring";
    pub const QUARANTINE: &str = "forecast_arena::quarantine";
    pub const STRATEGY: &str = "forecast_arena::strategy";
    pub const SESSION: &str = "forecast_arena::session";
    pub const HARNESS: &str = "forecast_arena::harness";
}

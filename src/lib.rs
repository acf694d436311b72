#![deny(unreachable_pub)]

// Core modules
mod consts;
mod errors;

// Shared types
pub mod types;

// Evaluation pipeline
pub mod evaluation;
pub mod harness;
pub mod quarantine;
pub mod scoring;
pub mod strategy;

// Process surface
pub mod config;
pub mod infra;
pub mod source;

#[cfg(test)]
mod tests;

// Re-exports
pub use config::{ArenaConfig, HarnessConfig, ReferenceConfig, ReferenceKind};
pub use consts::{DEFAULT_ROLLING_CAPACITY, LOG_SCORE_EPSILON, MIN_SCALE};
pub use errors::{Error, Result};
pub use evaluation::{EvaluationSession, LogScoreTracker, SessionConfig, SessionState, TickSnapshot};
pub use harness::{BenchmarkHarness, ComparisonReport, HarnessTick};
pub use quarantine::{Quarantine, QuarantineEntry};
pub use scoring::{
    pdf_score, score_mixture, squared_z_score, ComponentScore, MetricFn, MixtureScore,
    ScoringMetric,
};
pub use source::{JsonLinesSource, SyntheticWalk, SyntheticWalkConfig};
pub use strategy::{
    ConstantStrategy, EwmaVarianceConfig, EwmaVarianceStrategy, FadingVariance, ForecastStrategy,
    LastValueStrategy, RunningMetrics,
};
pub use types::*;

//! Arena configuration, loaded from TOML by the `arena` binary.
//!
//! Every section is optional; a missing file or section falls back to
//! defaults.
//!
//! ```toml
//! [candidate]
//! horizon = 10.0
//! fading_factor = 0.0001
//!
//! [reference]
//! kind = "last_value"
//! scale = 1.0
//!
//! [harness]
//! report_every = 1000
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::evaluation::SessionConfig;
use crate::infra::LogConfig;
use crate::source::SyntheticWalkConfig;
use crate::strategy::{ConstantStrategy, EwmaVarianceConfig, ForecastStrategy, LastValueStrategy};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArenaConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub candidate: EwmaVarianceConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub harness: HarnessConfig,
    #[serde(default)]
    pub source: SyntheticWalkConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

impl ArenaConfig {
    /// Validate every section, prefixing errors with the section name.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.session
            .validate()
            .map_err(|e| format!("[session] {e}"))?;
        self.candidate
            .validate()
            .map_err(|e| format!("[candidate] {e}"))?;
        self.reference
            .validate()
            .map_err(|e| format!("[reference] {e}"))?;
        self.harness
            .validate()
            .map_err(|e| format!("[harness] {e}"))?;
        self.source.validate().map_err(|e| format!("[source] {e}"))?;
        self.logging
            .validate()
            .map_err(|e| format!("[logging] {e}"))?;
        Ok(())
    }
}

/// Which baseline to benchmark against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Normal around the value observed one horizon earlier
    #[default]
    LastValue,
    /// Fixed normal
    Constant,
}

/// Reference strategy settings. The horizon is shared with the candidate.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub kind: ReferenceKind,

    /// Location, used by `constant` only.
    /// Default: 0.0
    #[serde(default)]
    pub loc: f64,

    /// Default: 1.0
    #[serde(default = "default_reference_scale")]
    pub scale: f64,
}

fn default_reference_scale() -> f64 {
    1.0
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            kind: ReferenceKind::default(),
            loc: 0.0,
            scale: default_reference_scale(),
        }
    }
}

impl ReferenceConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(format!(
                "scale must be finite and > 0.0, got {}",
                self.scale
            ));
        }
        if !self.loc.is_finite() {
            return Err(format!("loc must be finite, got {}", self.loc));
        }
        Ok(())
    }

    /// Build the configured reference strategy.
    pub fn build(&self, horizon: f64) -> Result<Box<dyn ForecastStrategy>> {
        Ok(match self.kind {
            ReferenceKind::LastValue => Box::new(LastValueStrategy::new(horizon, self.scale)?),
            ReferenceKind::Constant => {
                Box::new(ConstantStrategy::new(horizon, self.loc, self.scale))
            }
        })
    }
}

/// Harness reporting settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HarnessConfig {
    /// Ticks between comparison reports.
    /// Default: 1000
    #[serde(default = "default_report_every")]
    pub report_every: usize,

    /// Stop after this many observations (unbounded when unset).
    #[serde(default)]
    pub max_ticks: Option<usize>,
}

fn default_report_every() -> usize {
    1000
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            report_every: default_report_every(),
            max_ticks: None,
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.report_every == 0 {
            return Err("report_every must be > 0".to_string());
        }
        Ok(())
    }
}

//! Observation sources.
//!
//! The evaluation core performs no I/O; these adapters turn a seeded
//! simulation or a JSON-lines stream into [`Observation`]s for the harness
//! and the `arena` binary.

use std::io::BufRead;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{Error, Result};
use crate::types::Observation;

/// Configuration for [`SyntheticWalk`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SyntheticWalkConfig {
    /// RNG seed (0 = seed from entropy).
    /// Default: 42
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Std dev of the per-step Gaussian increment.
    /// Default: 1.0
    #[serde(default = "default_increment_std")]
    pub increment_std: f64,

    /// Probability of a jump on any step.
    /// Default: 0.02
    #[serde(default = "default_jump_probability")]
    pub jump_probability: f64,

    /// Std dev of a jump.
    /// Default: 10.0
    #[serde(default = "default_jump_std")]
    pub jump_std: f64,

    /// Time between consecutive observations.
    /// Default: 1.0
    #[serde(default = "default_time_step")]
    pub time_step: f64,
}

fn default_seed() -> u64 {
    42
}

fn default_increment_std() -> f64 {
    1.0
}

fn default_jump_probability() -> f64 {
    0.02
}

fn default_jump_std() -> f64 {
    10.0
}

fn default_time_step() -> f64 {
    1.0
}

impl Default for SyntheticWalkConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            increment_std: default_increment_std(),
            jump_probability: default_jump_probability(),
            jump_std: default_jump_std(),
            time_step: default_time_step(),
        }
    }
}

impl SyntheticWalkConfig {
    /// Validate parameter ranges.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.increment_std >= 0.0 && self.increment_std.is_finite()) {
            return Err(format!(
                "increment_std must be finite and >= 0.0, got {}",
                self.increment_std
            ));
        }
        if !(0.0..=1.0).contains(&self.jump_probability) {
            return Err(format!(
                "jump_probability must be in [0.0, 1.0], got {}",
                self.jump_probability
            ));
        }
        if !(self.jump_std >= 0.0 && self.jump_std.is_finite()) {
            return Err(format!(
                "jump_std must be finite and >= 0.0, got {}",
                self.jump_std
            ));
        }
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(format!(
                "time_step must be finite and > 0.0, got {}",
                self.time_step
            ));
        }
        Ok(())
    }
}

/// Endless Brownian walk with occasional Gaussian jumps.
///
/// Starts at location 0, time 0.
#[derive(Debug, Clone)]
pub struct SyntheticWalk {
    rng: SmallRng,
    increment: Normal<f64>,
    jump: Normal<f64>,
    jump_probability: f64,
    time_step: f64,
    step: u64,
    location: f64,
}

impl SyntheticWalk {
    /// # Errors
    /// `InvalidConfig` with the validation message if the config is out of range.
    pub fn new(config: &SyntheticWalkConfig) -> Result<Self> {
        config.validate().map_err(Error::InvalidConfig)?;

        let rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        let increment = Normal::new(0.0, config.increment_std)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let jump =
            Normal::new(0.0, config.jump_std).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        Ok(Self {
            rng,
            increment,
            jump,
            jump_probability: config.jump_probability,
            time_step: config.time_step,
            step: 0,
            location: 0.0,
        })
    }
}

impl Iterator for SyntheticWalk {
    type Item = Observation;

    fn next(&mut self) -> Option<Observation> {
        let time = self.step as f64 * self.time_step;
        let mut jumped = false;
        if self.step > 0 {
            self.location += self.increment.sample(&mut self.rng);
            if self.rng.gen::<f64>() < self.jump_probability {
                self.location += self.jump.sample(&mut self.rng);
                jumped = true;
            }
        }
        self.step += 1;

        Some(Observation::new(time, self.location).with_aux("jump", jumped))
    }
}

/// Observations parsed from JSON lines, one object per line.
///
/// Blank lines are skipped. Each item is a `Result` so the caller decides
/// whether a bad line is fatal. A read error ends the stream after it is
/// yielded.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_no: usize,
    failed: bool,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            failed: false,
        }
    }

    /// Keep only well-formed observations, logging and skipping the rest.
    pub fn skip_invalid(self) -> impl Iterator<Item = Observation> {
        self.filter_map(|item| match item {
            Ok(obs) => Some(obs),
            Err(e) => {
                warn!(error = %e, "Skipping malformed observation");
                None
            }
        })
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            self.line.clear();
            self.line_no += 1;
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = self.line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|e| {
                        Error::Parse(format!("line {}: {}", self.line_no, e))
                    }));
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

//! Predictive distributions emitted by forecast strategies.
//!
//! Wire shape (JSON):
//!
//! ```text
//! {"type": "single", "family": "normal", "params": {"loc": 0.0, "scale": 1.0}}
//! {"type": "mixture", "components": [
//!     {"weight": 0.95, "density": {"family": "normal", "params": {"loc": 0.0, "scale": 1.0}}},
//!     {"weight": 0.05, "density": {"family": "normal", "params": {"loc": 0.0, "scale": 4.0}}}
//! ]}
//! ```

use serde::{Deserialize, Serialize};

/// Parametric family of a density component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityFamily {
    /// Gaussian, parameterized by `loc` (mean) and `scale` (std dev)
    #[default]
    #[serde(alias = "norm")]
    Normal,
}

/// Location/scale parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DensityParams {
    pub loc: f64,
    pub scale: f64,
}

/// A single parametric density.
///
/// `scale > 0` is not checked here; scoring rejects invalid scales.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Density {
    #[serde(default)]
    pub family: DensityFamily,
    pub params: DensityParams,
}

impl Density {
    /// Normal density with the given mean and standard deviation.
    pub fn normal(loc: f64, scale: f64) -> Self {
        Self {
            family: DensityFamily::Normal,
            params: DensityParams { loc, scale },
        }
    }

    #[inline]
    pub fn loc(&self) -> f64 {
        self.params.loc
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.params.scale
    }
}

/// One weighted component of a mixture.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MixtureComponent {
    /// Non-negative weight; mixtures are never renormalized
    pub weight: f64,
    pub density: Density,
}

impl MixtureComponent {
    pub fn new(weight: f64, density: Density) -> Self {
        Self { weight, density }
    }
}

/// Forecast for the value one horizon ahead.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredictiveDistribution {
    /// A lone density, scored as a mixture with a single weight-1 component
    Single(Density),
    /// Weighted combination of densities
    Mixture { components: Vec<MixtureComponent> },
}

impl PredictiveDistribution {
    /// Single normal density.
    pub fn normal(loc: f64, scale: f64) -> Self {
        Self::Single(Density::normal(loc, scale))
    }

    /// Mixture from `(weight, density)` pairs, in order.
    pub fn mixture(components: impl IntoIterator<Item = (f64, Density)>) -> Self {
        Self::Mixture {
            components: components
                .into_iter()
                .map(|(weight, density)| MixtureComponent::new(weight, density))
                .collect(),
        }
    }

    /// Iterate components in order. A `Single` yields one component of weight 1.
    pub fn components(&self) -> impl Iterator<Item = MixtureComponent> + '_ {
        let (single, rest) = match self {
            Self::Single(density) => (Some(MixtureComponent::new(1.0, *density)), &[][..]),
            Self::Mixture { components } => (None, components.as_slice()),
        };
        single.into_iter().chain(rest.iter().copied())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Mixture { components } => components.len(),
        }
    }

    /// True for a mixture with no components.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

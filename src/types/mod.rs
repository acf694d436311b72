//! Shared data model: observations flowing in, predictive distributions
//! flowing out of strategies.

mod distribution;
mod observation;

pub use distribution::*;
pub use observation::*;

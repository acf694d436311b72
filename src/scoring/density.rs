//! Closed-form normal density metrics.

use std::f64::consts::PI;

use crate::errors::{Error, Result};

#[inline]
pub(super) fn check_scale(scale: f64) -> Result<()> {
    // Written negated so NaN is rejected too
    if !(scale > 0.0) {
        return Err(Error::InvalidParameter {
            name: "scale",
            value: scale,
        });
    }
    Ok(())
}

/// Normal probability density of `x` under `N(loc, scale²)`.
///
/// # Errors
/// `InvalidParameter` if `scale <= 0` or is NaN.
pub fn pdf_score(x: f64, loc: f64, scale: f64) -> Result<f64> {
    check_scale(scale)?;

    // Standardize first: scale² under- or overflows long before the density does
    let z = (x - loc) / scale;
    let two_pi_var = 2.0 * PI * scale * scale;
    let normalization = if two_pi_var.is_normal() {
        1.0 / two_pi_var.sqrt()
    } else {
        1.0 / (scale * (2.0 * PI).sqrt())
    };

    Ok(normalization * (-0.5 * z * z).exp())
}

/// Squared z-score: deviation from `loc` in units of `scale`, squared.
///
/// # Errors
/// `InvalidParameter` if `scale <= 0` or is NaN.
pub fn squared_z_score(x: f64, loc: f64, scale: f64) -> Result<f64> {
    check_scale(scale)?;

    let z = (x - loc) / scale;
    Ok(z * z)
}

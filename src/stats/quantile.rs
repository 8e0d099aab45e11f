//! Quantiles with linear interpolation between closest ranks.
//!
//! For sorted values `x_0 <= ... <= x_{n-1}` the `q` quantile sits at position
//! `(n - 1) * q`, interpolating between the two neighbouring ranks.

use crate::error::AppError;

pub fn quantile(values: &[f64], q: f64) -> Result<f64, AppError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(AppError::new(2, format!("Quantile {q} is outside [0, 1].")));
    }
    if values.is_empty() {
        return Err(AppError::new(4, "Cannot compute a quantile of an empty sample."));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Cannot compute a quantile of non-finite values."));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

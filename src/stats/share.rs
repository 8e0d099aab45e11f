//! Percentage shares and cumulative sums.

use crate::error::AppError;

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Express each value as a percentage of the total, rounded to 2 decimals.
///
/// `what` names the group in the error raised when the total is zero.
pub fn percent_shares(values: &[f64], what: &str) -> Result<Vec<f64>, AppError> {
    let total: f64 = values.iter().sum();
    if !total.is_finite() {
        return Err(AppError::new(4, format!("Total for {what} is not finite.")));
    }
    if total == 0.0 {
        return Err(AppError::new(
            4,
            format!("Cannot compute shares for {what}: total is zero."),
        ));
    }
    Ok(values.iter().map(|v| round_to(v / total * 100.0, 2)).collect())
}

/// Running sum, rounded to 2 decimals at every step.
pub fn cumulative(values: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .iter()
        .map(|v| {
            acc = round_to(acc + v, 2);
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_hundred() {
        let shares = percent_shares(&[1.0, 1.0, 1.0], "test").unwrap();
        assert_eq!(shares, vec![33.33, 33.33, 33.33]);
        let sum: f64 = shares.iter().sum();
        assert!((sum - 100.0).abs() < 0.05);
    }

    #[test]
    fn zero_total_is_an_error() {
        let err = percent_shares(&[0.0, 0.0], "year 2021").unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("year 2021"));
    }

    #[test]
    fn cumulative_is_non_decreasing() {
        let c = cumulative(&[50.0, 30.25, 19.75, 0.0]);
        assert_eq!(c, vec![50.0, 80.25, 100.0, 100.0]);
        assert!(c.windows(2).all(|w| w[0] <= w[1]));
    }
}

//! Paired (dependent samples) t-test.
//!
//! For matched observations `a_i`, `b_i` we test whether the mean of the
//! differences `d_i = a_i - b_i` is zero:
//!
//! ```text
//! t = mean(d) / (sd(d) / sqrt(n)),   df = n - 1
//! ```
//!
//! The two-tailed p-value comes from the Student's t survival function.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::AppError;

/// Outcome of a paired t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedTTest {
    pub t_stat: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
    pub df: f64,
    pub n: usize,
    pub mean_difference: f64,
}

impl PairedTTest {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Run a paired t-test on `a - b`.
pub fn paired_t_test(a: &[f64], b: &[f64]) -> Result<PairedTTest, AppError> {
    if a.len() != b.len() {
        return Err(AppError::new(
            4,
            format!("Paired t-test requires equal-length samples (got {} and {}).", a.len(), b.len()),
        ));
    }
    let n = a.len();
    if n < 2 {
        return Err(AppError::new(
            4,
            format!("Paired t-test requires at least 2 pairs (got {n})."),
        ));
    }

    let diffs: Vec<f64> = a.iter().zip(b).map(|(x, y)| x - y).collect();
    if diffs.iter().any(|d| !d.is_finite()) {
        return Err(AppError::new(4, "Paired t-test received non-finite values."));
    }

    let nf = n as f64;
    let mean = diffs.iter().sum::<f64>() / nf;
    let var = diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / (nf - 1.0);
    let sd = var.sqrt();
    if !(sd.is_finite() && sd > 0.0) {
        return Err(AppError::new(
            4,
            "Paired t-test is undefined: the paired differences have zero variance.",
        ));
    }

    let df = nf - 1.0;
    let t_stat = mean / (sd / nf.sqrt());
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AppError::new(4, format!("Student's t distribution error: {e}")))?;
    let p_value = (2.0 * dist.sf(t_stat.abs())).min(1.0);

    Ok(PairedTTest {
        t_stat,
        p_value,
        df,
        n,
        mean_difference: mean,
    })
}

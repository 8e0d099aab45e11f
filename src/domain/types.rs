//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - built by CSV ingest or by the synthetic sample generator
//! - grouped and pivoted by the analysis passes
//! - exported to CSV/JSON

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::AppError;

/// Default significance level for the discount t-tests.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Monthly trend values are reported in thousands of units.
pub const DEFAULT_TREND_SCALE: f64 = 1000.0;

/// Default number of rows printed per table on the console.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// One sales line item, exactly as read from the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub order_id: String,
    pub date: NaiveDate,
    pub product: String,
    pub category: String,
    pub customer_id: String,
    pub customer_type: String,
    pub region: String,
    pub quantity: i64,
    pub unit_price: Option<f64>,
    pub total_price: f64,
    pub discount: DiscountLevel,
}

/// A transaction augmented with calendar fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub tx: Transaction,
    pub year: i32,
    pub month: u32,
    pub season: Season,
}

/// Slack for binary rounding when scaling a decimal rate to basis points.
const BASIS_POINT_TOLERANCE: f64 = 1e-6;

/// Discount rate keyed at basis-point resolution.
///
/// Rates are stored as integers so they can be used as exact grouping keys:
/// `0.05` becomes `500`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscountLevel(u32);

impl DiscountLevel {
    /// The zero-discount baseline.
    pub const NONE: DiscountLevel = DiscountLevel(0);

    /// Convert a decimal rate (`0.15`) into a level.
    ///
    /// Returns `None` for negative or non-finite rates, and for rates finer
    /// than one basis point (`0.00004`, `0.12345`).
    pub fn from_rate(rate: f64) -> Option<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return None;
        }
        let scaled = rate * 10_000.0;
        let bp = scaled.round();
        if bp > u32::MAX as f64 || (scaled - bp).abs() > BASIS_POINT_TOLERANCE {
            return None;
        }
        Some(Self(bp as u32))
    }

    pub fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    pub fn basis_points(self) -> u32 {
        self.0
    }

    pub fn rate(self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    pub fn is_baseline(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DiscountLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rate())
    }
}

/// Meteorological season derived from the calendar month.
///
/// Declaration order is the grouping-key order used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Dec–Feb: Winter, Mar–May: Spring, Jun–Aug: Summer, Sep–Nov: Fall.
    ///
    /// Returns `None` only for values outside `1..=12`.
    pub fn for_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Purchase-frequency class assigned from the repetition quartiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CustomerBehavior {
    /// Repetition strictly below Q1.
    LowActivity,
    /// Repetition within `[Q1, Q3]`.
    LoyalCustomer,
    /// Repetition strictly above Q3.
    HighActivity,
}

impl CustomerBehavior {
    pub const ALL: [CustomerBehavior; 3] = [
        CustomerBehavior::LowActivity,
        CustomerBehavior::LoyalCustomer,
        CustomerBehavior::HighActivity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CustomerBehavior::LowActivity => "Low Activity",
            CustomerBehavior::LoyalCustomer => "Loyal Customer",
            CustomerBehavior::HighActivity => "High Activity",
        }
    }
}

impl fmt::Display for CustomerBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved configuration for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub out_dir: PathBuf,
    /// Year used by the loyalty segmentation. `None` means the latest year in the data.
    pub target_year: Option<i32>,
    /// Two-tailed significance level for the discount t-tests.
    pub alpha: f64,
    /// Divisor applied to monthly quantities before rounding.
    pub trend_scale: f64,
    pub preview_rows: usize,
    pub charts: bool,
}

impl AnalysisConfig {
    pub fn new(input_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            out_dir: out_dir.into(),
            target_year: None,
            alpha: DEFAULT_ALPHA,
            trend_scale: DEFAULT_TREND_SCALE,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            charts: true,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.alpha.is_finite() && self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AppError::new(
                2,
                format!("Invalid significance level {} (must be in (0, 1)).", self.alpha),
            ));
        }
        if !(self.trend_scale.is_finite() && self.trend_scale > 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid trend scale {} (must be finite and > 0).", self.trend_scale),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_mapping_is_total() {
        for month in 1..=12 {
            assert!(Season::for_month(month).is_some(), "month {month} has no season");
        }
        assert_eq!(Season::for_month(0), None);
        assert_eq!(Season::for_month(13), None);
    }

    #[test]
    fn season_mapping_matches_calendar() {
        assert_eq!(Season::for_month(1), Some(Season::Winter));
        assert_eq!(Season::for_month(6), Some(Season::Summer));
        assert_eq!(Season::for_month(12), Some(Season::Winter));
        assert_eq!(Season::for_month(3), Some(Season::Spring));
        assert_eq!(Season::for_month(11), Some(Season::Fall));

        let per_season = Season::ALL.map(|s| (1..=12).filter(|&m| Season::for_month(m) == Some(s)).count());
        assert_eq!(per_season, [3, 3, 3, 3]);
    }

    #[test]
    fn discount_level_roundtrips_common_rates() {
        let level = DiscountLevel::from_rate(0.05).unwrap();
        assert_eq!(level.basis_points(), 500);
        assert_eq!(level.to_string(), "0.05");
        assert_eq!(DiscountLevel::from_rate(0.1).unwrap().to_string(), "0.1");
        assert!(DiscountLevel::from_rate(0.0).unwrap().is_baseline());
        assert_eq!(DiscountLevel::from_rate(-0.1), None);
        assert_eq!(DiscountLevel::from_rate(f64::NAN), None);
    }

    #[test]
    fn sub_basis_point_rates_are_rejected() {
        assert_eq!(DiscountLevel::from_rate(0.00004), None);
        assert_eq!(DiscountLevel::from_rate(0.12345), None);
        assert_eq!(DiscountLevel::from_rate(0.1235).unwrap().basis_points(), 1235);
        assert_eq!(DiscountLevel::from_rate(0.15).unwrap().basis_points(), 1500);
    }

    #[test]
    fn config_rejects_bad_alpha() {
        let mut config = AnalysisConfig::new("in.csv", "out");
        assert!(config.validate().is_ok());
        config.alpha = 1.5;
        assert_eq!(config.validate().unwrap_err().exit_code(), 2);
    }
}

//! Seasonal distribution of sold quantity.

use crate::analysis::group::sum_quantity_by;
use crate::domain::{SalesRecord, Season};
use crate::error::AppError;
use crate::plot::{Chart, ChartSpec, PieChart, PieSlice};
use crate::report::{Cell, Table};
use crate::stats::percent_shares;

pub const TABLE_NAME: &str = "seasonal_sales_analysis";
pub const CHART_NAME: &str = "seasonal_sales_distribution";

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTotal {
    pub season: Season,
    pub quantity: i64,
    /// Percentage of the all-season total.
    pub share: f64,
}

/// Quantity per season, in season order. Only seasons with sales appear.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalSales {
    pub seasons: Vec<SeasonTotal>,
}

pub fn seasonal_sales(records: &[SalesRecord]) -> Result<SeasonalSales, AppError> {
    let sums = sum_quantity_by(records, |r| r.season)?;
    let quantities: Vec<f64> = sums.values().map(|&q| q as f64).collect();
    let shares = percent_shares(&quantities, "seasonal sales")?;

    let seasons = sums
        .into_iter()
        .zip(shares)
        .map(|((season, quantity), share)| SeasonTotal { season, quantity, share })
        .collect();
    Ok(SeasonalSales { seasons })
}

impl SeasonalSales {
    pub fn quantity(&self, season: Season) -> Option<i64> {
        self.seasons.iter().find(|s| s.season == season).map(|s| s.quantity)
    }

    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut table = Table::new(TABLE_NAME, ["Season", "Quantity"]);
        for s in &self.seasons {
            table.push_row(vec![Cell::text(s.season.label()), Cell::Int(s.quantity)])?;
        }
        Ok(table)
    }

    pub fn chart(&self) -> Chart {
        Chart {
            name: CHART_NAME.to_string(),
            title: "Sales Distribution by Season".to_string(),
            spec: ChartSpec::Pie(PieChart {
                title: String::new(),
                slices: self
                    .seasons
                    .iter()
                    .map(|s| PieSlice {
                        label: s.season.label().to_string(),
                        value: s.quantity as f64,
                    })
                    .collect(),
                label_decimals: 1,
            }),
        }
    }
}

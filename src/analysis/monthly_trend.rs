//! Monthly trend series: quantity per (month, year), scaled and rounded.

use crate::analysis::group::Pivot;
use crate::domain::SalesRecord;
use crate::error::AppError;
use crate::plot::{Chart, ChartSpec, LineChart, Series};
use crate::report::{Cell, Table};

pub const TABLE_NAME: &str = "monthly_sales_trend";
pub const CHART_NAME: &str = "monthly_sales_trend";

#[derive(Debug, Clone, PartialEq)]
pub struct MonthRow {
    pub month: u32,
    /// Scaled quantity per year, aligned with `MonthlyTrend::years`.
    pub values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTrend {
    pub years: Vec<i32>,
    /// Months with sales, ascending (1..=12).
    pub months: Vec<MonthRow>,
}

/// Sum quantity per (month, year) and divide by `scale`, rounding half to even.
pub fn monthly_trend(records: &[SalesRecord], scale: f64) -> Result<MonthlyTrend, AppError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(AppError::new(2, format!("Invalid trend scale {scale}.")));
    }

    let pivot = Pivot::of_quantity(records, |r| r.month, |r| r.year)?;
    let years = pivot.columns().to_vec();
    let months = pivot
        .rows()
        .iter()
        .map(|&month| MonthRow {
            month,
            values: years
                .iter()
                .map(|y| (pivot.value(&month, y) as f64 / scale).round_ties_even() as i64)
                .collect(),
        })
        .collect();

    Ok(MonthlyTrend { years, months })
}

impl MonthlyTrend {
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns = vec!["Month".to_string()];
        columns.extend(self.years.iter().map(|y| y.to_string()));

        let mut table = Table::new(TABLE_NAME, columns);
        for row in &self.months {
            let mut cells = vec![Cell::Int(row.month as i64)];
            cells.extend(row.values.iter().map(|&v| Cell::Int(v)));
            table.push_row(cells)?;
        }
        Ok(table)
    }

    /// One line per year.
    pub fn chart(&self) -> Chart {
        let series = self
            .years
            .iter()
            .enumerate()
            .map(|(i, year)| Series {
                name: year.to_string(),
                points: self
                    .months
                    .iter()
                    .map(|row| (row.month as f64, row.values[i] as f64))
                    .collect(),
            })
            .collect();

        Chart {
            name: CHART_NAME.to_string(),
            title: "Monthly Sales Trends Over Different Years".to_string(),
            spec: ChartSpec::Lines(LineChart {
                x_label: "Month".to_string(),
                y_label: "Sales (in thousands)".to_string(),
                legend_title: "Year".to_string(),
                series,
            }),
        }
    }
}

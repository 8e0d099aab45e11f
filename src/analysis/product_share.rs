//! Year-over-year product share.
//!
//! Quantity per (product, year), each product's share of its year's total,
//! and a running cumulative share in descending order of the latest year.

use std::cmp::Ordering;

use crate::analysis::group::Pivot;
use crate::domain::SalesRecord;
use crate::error::AppError;
use crate::report::{Cell, Table};
use crate::stats::{cumulative, percent_shares};

pub const TABLE_NAME: &str = "yearly_product_sales";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductShareRow {
    pub product: String,
    /// Quantity per year, aligned with `ProductShare::years`.
    pub quantities: Vec<i64>,
    pub shares: Vec<f64>,
    pub cumulative_shares: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductShare {
    pub years: Vec<i32>,
    pub rows: Vec<ProductShareRow>,
}

pub fn yearly_product_share(records: &[SalesRecord]) -> Result<ProductShare, AppError> {
    let pivot = Pivot::of_quantity(records, |r| r.tx.product.clone(), |r| r.year)?;
    let years = pivot.columns().to_vec();
    let Some(&latest) = years.last() else {
        return Err(AppError::new(3, "No sales to compute product shares from."));
    };

    // Row order: descending quantity in the latest year, ties by product name.
    let mut products = pivot.rows().to_vec();
    products.sort_by(|a, b| match pivot.value(b, &latest).cmp(&pivot.value(a, &latest)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });

    let mut shares_by_year = Vec::with_capacity(years.len());
    let mut cumulative_by_year = Vec::with_capacity(years.len());
    for year in &years {
        let quantities: Vec<f64> = products.iter().map(|p| pivot.value(p, year) as f64).collect();
        let shares = percent_shares(&quantities, &format!("year {year}"))?;
        cumulative_by_year.push(cumulative(&shares));
        shares_by_year.push(shares);
    }

    let rows = products
        .iter()
        .enumerate()
        .map(|(i, product)| ProductShareRow {
            product: product.clone(),
            quantities: years.iter().map(|y| pivot.value(product, y)).collect(),
            shares: shares_by_year.iter().map(|col| col[i]).collect(),
            cumulative_shares: cumulative_by_year.iter().map(|col| col[i]).collect(),
        })
        .collect();

    Ok(ProductShare { years, rows })
}

impl ProductShare {
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns = vec!["Product".to_string()];
        columns.extend(self.years.iter().map(|y| y.to_string()));
        columns.extend(self.years.iter().map(|y| format!("Share in {y}")));
        columns.extend(self.years.iter().map(|y| format!("Cumulative Share in {y}")));

        let mut table = Table::new(TABLE_NAME, columns);
        for row in &self.rows {
            let mut cells = vec![Cell::text(&row.product)];
            cells.extend(row.quantities.iter().map(|&q| Cell::Int(q)));
            cells.extend(row.shares.iter().map(|&s| Cell::Float(s)));
            cells.extend(row.cumulative_shares.iter().map(|&s| Cell::Float(s)));
            table.push_row(cells)?;
        }
        Ok(table)
    }
}

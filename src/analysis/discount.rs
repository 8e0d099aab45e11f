//! Discount impact: does a discount tier change per-product quantity?
//!
//! Quantities are pivoted by (product, discount level). The zero-discount
//! column is the baseline; every other tier is compared against it with a
//! paired t-test across products. Pairing is by product, so every product
//! must have sales at every tier.

use crate::analysis::group::Pivot;
use crate::domain::{DiscountLevel, SalesRecord};
use crate::error::AppError;
use crate::report::{Cell, Table};
use crate::stats::{PairedTTest, paired_t_test};

pub const TABLE_NAME: &str = "sales_per_discount";
pub const TTEST_TABLE_NAME: &str = "discount_ttest_results";
pub const BASELINE_LABEL: &str = "Without Discount";

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountRow {
    pub product: String,
    pub baseline: i64,
    /// Quantity per non-baseline tier, aligned with `DiscountImpact::levels`.
    pub discounted: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountVerdict {
    pub level: DiscountLevel,
    pub test: PairedTTest,
    pub significant: bool,
}

impl DiscountVerdict {
    pub fn label(&self) -> &'static str {
        if self.significant { "Significant" } else { "Not Significant" }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountImpact {
    /// Non-baseline discount tiers, ascending.
    pub levels: Vec<DiscountLevel>,
    pub rows: Vec<DiscountRow>,
    pub verdicts: Vec<DiscountVerdict>,
}

pub fn discount_impact(records: &[SalesRecord], alpha: f64) -> Result<DiscountImpact, AppError> {
    let pivot = Pivot::of_quantity(records, |r| r.tx.product.clone(), |r| r.tx.discount)?;

    if !pivot.columns().contains(&DiscountLevel::NONE) {
        return Err(AppError::new(
            4,
            "No zero-discount sales found: the discount t-tests need a baseline tier.",
        ));
    }
    let levels: Vec<DiscountLevel> = pivot
        .columns()
        .iter()
        .copied()
        .filter(|l| !l.is_baseline())
        .collect();

    ensure_complete_pairing(&pivot)?;

    let baseline: Vec<f64> = pivot
        .column_values(&DiscountLevel::NONE)
        .into_iter()
        .map(|q| q as f64)
        .collect();

    let mut verdicts = Vec::with_capacity(levels.len());
    for &level in &levels {
        let discounted: Vec<f64> = pivot.column_values(&level).into_iter().map(|q| q as f64).collect();
        let test = paired_t_test(&baseline, &discounted).map_err(|e| {
            AppError::new(e.exit_code(), format!("Discount {level} vs baseline: {}", e.message()))
        })?;
        verdicts.push(DiscountVerdict {
            level,
            significant: test.is_significant(alpha),
            test,
        });
    }

    let rows = pivot
        .rows()
        .iter()
        .map(|product| DiscountRow {
            product: product.clone(),
            baseline: pivot.value(product, &DiscountLevel::NONE),
            discounted: levels.iter().map(|l| pivot.value(product, l)).collect(),
        })
        .collect();

    Ok(DiscountImpact { levels, rows, verdicts })
}

/// Every product must appear in every discount column.
fn ensure_complete_pairing(pivot: &Pivot<String, DiscountLevel>) -> Result<(), AppError> {
    for product in pivot.rows() {
        for level in pivot.columns() {
            if pivot.get(product, level).is_none() {
                let tier = if level.is_baseline() {
                    BASELINE_LABEL.to_string()
                } else {
                    format!("discount {level}")
                };
                return Err(AppError::new(
                    4,
                    format!(
                        "Product '{product}' has no sales at {tier}; the paired t-test requires every product at every discount level."
                    ),
                ));
            }
        }
    }
    Ok(())
}

impl DiscountImpact {
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns = vec!["Product".to_string(), BASELINE_LABEL.to_string()];
        columns.extend(self.levels.iter().map(|l| l.to_string()));

        let mut table = Table::new(TABLE_NAME, columns);
        for row in &self.rows {
            let mut cells = vec![Cell::text(&row.product), Cell::Int(row.baseline)];
            cells.extend(row.discounted.iter().map(|&q| Cell::Int(q)));
            table.push_row(cells)?;
        }
        Ok(table)
    }

    pub fn ttest_table(&self) -> Result<Table, AppError> {
        let mut table = Table::new(TTEST_TABLE_NAME, ["Discount", "T_stat", "P_value", "Significance"]);
        for v in &self.verdicts {
            table.push_row(vec![
                Cell::Float(v.level.rate()),
                Cell::Float(v.test.t_stat),
                Cell::Float(v.test.p_value),
                Cell::text(v.label()),
            ])?;
        }
        Ok(table)
    }
}

//! Customer-type (channel) share of each product category.

use crate::analysis::group::Pivot;
use crate::domain::SalesRecord;
use crate::error::AppError;
use crate::plot::{Chart, ChartSpec, PieChart, PieSlice};
use crate::report::{Cell, Table};
use crate::stats::percent_shares;

pub const TABLE_NAME: &str = "customer_type_category_share";
pub const CHART_NAME: &str = "customer_type_category_share";

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelShare {
    pub customer_types: Vec<String>,
    pub categories: Vec<String>,
    /// `shares[t][c]`: percentage of customer type `t`'s quantity in category `c`.
    pub shares: Vec<Vec<f64>>,
}

pub fn channel_share(records: &[SalesRecord]) -> Result<ChannelShare, AppError> {
    let pivot = Pivot::of_quantity(records, |r| r.tx.category.clone(), |r| r.tx.customer_type.clone())?;

    let shares = pivot
        .columns()
        .iter()
        .map(|customer_type| {
            let quantities: Vec<f64> = pivot
                .column_values(customer_type)
                .into_iter()
                .map(|q| q as f64)
                .collect();
            percent_shares(&quantities, &format!("customer type '{customer_type}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChannelShare {
        customer_types: pivot.columns().to_vec(),
        categories: pivot.rows().to_vec(),
        shares,
    })
}

impl ChannelShare {
    pub fn to_table(&self) -> Result<Table, AppError> {
        let mut columns = vec!["Category".to_string()];
        columns.extend(self.customer_types.iter().cloned());

        let mut table = Table::new(TABLE_NAME, columns);
        for (c, category) in self.categories.iter().enumerate() {
            let mut cells = vec![Cell::text(category)];
            cells.extend(self.shares.iter().map(|col| Cell::Float(col[c])));
            table.push_row(cells)?;
        }
        Ok(table)
    }

    /// One pie per customer type, side by side.
    pub fn chart(&self) -> Chart {
        let pies = self
            .customer_types
            .iter()
            .zip(&self.shares)
            .map(|(customer_type, shares)| PieChart {
                title: format!("Share of Channels - {customer_type}"),
                slices: self
                    .categories
                    .iter()
                    .zip(shares)
                    .map(|(category, &value)| PieSlice { label: category.clone(), value })
                    .collect(),
                label_decimals: 0,
            })
            .collect();

        Chart {
            name: CHART_NAME.to_string(),
            title: "Customer Type vs. Category Sales Share".to_string(),
            spec: ChartSpec::PieGrid(pies),
        }
    }
}

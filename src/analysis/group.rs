//! Grouping, aggregation, and pivoting over sales records.
//!
//! Every pass is a variation of "group by some keys, then sum or count".
//! Keys are ordered (`BTreeMap`), so group order is deterministic and matches
//! the natural ordering of each key type.

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{DiscountLevel, SalesRecord};
use crate::error::AppError;
use crate::report::Cell;

/// A column that records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Order,
    Customer,
    Region,
    Discount,
}

impl GroupKey {
    /// Column header used when the key is written to a report.
    pub fn column_name(self) -> &'static str {
        match self {
            GroupKey::Order => "Order_ID",
            GroupKey::Customer => "Customer_ID",
            GroupKey::Region => "Region",
            GroupKey::Discount => "Discount",
        }
    }

    pub fn extract(self, record: &SalesRecord) -> KeyValue {
        let tx = &record.tx;
        match self {
            GroupKey::Order => KeyValue::Text(tx.order_id.clone()),
            GroupKey::Customer => KeyValue::Text(tx.customer_id.clone()),
            GroupKey::Region => KeyValue::Text(tx.region.clone()),
            GroupKey::Discount => KeyValue::Discount(tx.discount),
        }
    }

    /// Extract several keys at once, in order.
    pub fn extract_all(keys: &[GroupKey], record: &SalesRecord) -> Vec<KeyValue> {
        keys.iter().map(|k| k.extract(record)).collect()
    }
}

/// The value of one grouping key for one record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Text(String),
    Discount(DiscountLevel),
}

impl KeyValue {
    pub fn to_cell(&self) -> Cell {
        match self {
            KeyValue::Text(s) => Cell::Text(s.clone()),
            KeyValue::Discount(d) => Cell::Float(d.rate()),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Text(s) => f.write_str(s),
            KeyValue::Discount(d) => write!(f, "{d}"),
        }
    }
}

/// Count and sum of one numeric column within a group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregate {
    pub count: usize,
    pub sum: f64,
}

impl Aggregate {
    fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }
}

/// Group items by `key` and aggregate `value` (count + sum) per group.
pub fn aggregate_by<'a, T: 'a, K: Ord>(
    items: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> K,
    value: impl Fn(&T) -> f64,
) -> BTreeMap<K, Aggregate> {
    let mut groups: BTreeMap<K, Aggregate> = BTreeMap::new();
    for item in items {
        groups.entry(key(item)).or_default().add(value(item));
    }
    groups
}

/// Group records by `key` and sum their quantities.
///
/// A group total outside the `i64` range is a computation error (code 4).
pub fn sum_quantity_by<K: Ord>(
    records: &[SalesRecord],
    key: impl Fn(&SalesRecord) -> K,
) -> Result<BTreeMap<K, i64>, AppError> {
    let mut groups: BTreeMap<K, i64> = BTreeMap::new();
    for r in records {
        let sum = groups.entry(key(r)).or_default();
        *sum = sum.checked_add(r.tx.quantity).ok_or_else(|| {
            AppError::new(
                4,
                format!("Quantity sum overflows at order '{}' (quantity {}).", r.tx.order_id, r.tx.quantity),
            )
        })?;
    }
    Ok(groups)
}

/// A two-dimensional pivot of integer sums (`row key × column key`).
///
/// Rows and columns are the distinct keys in ascending order. Absent cells
/// read as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Pivot<R, C> {
    rows: Vec<R>,
    columns: Vec<C>,
    cells: BTreeMap<(R, C), i64>,
}

impl<R: Ord + Clone, C: Ord + Clone> Pivot<R, C> {
    pub fn from_sums(cells: BTreeMap<(R, C), i64>) -> Self {
        let mut rows: Vec<R> = cells.keys().map(|(r, _)| r.clone()).collect();
        rows.dedup();
        let mut columns: Vec<C> = cells.keys().map(|(_, c)| c.clone()).collect();
        columns.sort();
        columns.dedup();
        Self { rows, columns, cells }
    }

    /// Sum record quantities into a pivot keyed by `(row(r), column(r))`.
    pub fn of_quantity(
        records: &[SalesRecord],
        row: impl Fn(&SalesRecord) -> R,
        column: impl Fn(&SalesRecord) -> C,
    ) -> Result<Self, AppError> {
        Ok(Self::from_sums(sum_quantity_by(records, |r| (row(r), column(r)))?))
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    /// The cell value, or `None` when the combination never occurred.
    pub fn get(&self, row: &R, column: &C) -> Option<i64> {
        self.cells.get(&(row.clone(), column.clone())).copied()
    }

    pub fn value(&self, row: &R, column: &C) -> i64 {
        self.get(row, column).unwrap_or(0)
    }

    /// One column's values in row order (absent cells as zero).
    pub fn column_values(&self, column: &C) -> Vec<i64> {
        self.rows.iter().map(|r| self.value(r, column)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{records, tx};
    use crate::domain::Transaction;

    #[test]
    fn pivot_orders_keys_and_fills_zero() {
        let recs = records(vec![
            Transaction { product: "Water".into(), ..tx("O1", 2022, 1, 5) },
            Transaction { product: "Cola".into(), ..tx("O2", 2023, 1, 7) },
            Transaction { product: "Cola".into(), ..tx("O3", 2023, 2, 3) },
        ]);
        let pivot = Pivot::of_quantity(&recs, |r| r.tx.product.clone(), |r| r.year).unwrap();

        assert_eq!(pivot.rows(), ["Cola".to_string(), "Water".to_string()]);
        assert_eq!(pivot.columns(), [2022, 2023]);
        assert_eq!(pivot.value(&"Cola".to_string(), &2023), 10);
        assert_eq!(pivot.get(&"Cola".to_string(), &2022), None);
        assert_eq!(pivot.column_values(&2022), vec![0, 5]);
    }

    #[test]
    fn aggregate_counts_and_sums() {
        let recs = records(vec![tx("O1", 2023, 1, 2), tx("O1", 2023, 1, 3), tx("O2", 2023, 1, 4)]);
        let groups = aggregate_by(&recs, |r| GroupKey::Order.extract(r), |r| r.tx.total_price);

        let o1 = groups[&KeyValue::Text("O1".into())];
        assert_eq!(o1.count, 2);
        assert!((o1.sum - 10.0).abs() < 1e-12);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn key_values_render_as_cells() {
        assert_eq!(KeyValue::Text("North".into()).to_cell(), Cell::text("North"));
        assert_eq!(
            KeyValue::Discount(DiscountLevel::from_basis_points(1000)).to_cell(),
            Cell::Float(0.1)
        );
    }

    #[test]
    fn quantity_overflow_is_an_error() {
        let big = i64::MAX / 2 + 1;
        let recs = records(vec![tx("O1", 2023, 1, big), tx("O2", 2023, 2, big)]);

        let err = sum_quantity_by(&recs, |r| r.year).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.message().contains("O2"));
        assert!(Pivot::of_quantity(&recs, |r| r.month, |r| r.year).is_ok());
    }
}

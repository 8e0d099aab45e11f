//! Calendar enrichment: year, month, and season from the order date.

use chrono::Datelike;

use crate::domain::{SalesRecord, Season, Transaction};
use crate::error::AppError;

/// Augment every transaction with its calendar fields.
pub fn enrich(transactions: Vec<Transaction>) -> Result<Vec<SalesRecord>, AppError> {
    transactions
        .into_iter()
        .map(|tx| {
            let month = tx.date.month();
            let season = Season::for_month(month).ok_or_else(|| {
                AppError::new(3, format!("Order '{}' has an invalid month {month}.", tx.order_id))
            })?;
            Ok(SalesRecord {
                year: tx.date.year(),
                month,
                season,
                tx,
            })
        })
        .collect()
}

/// Distinct years present, ascending.
pub fn years_present(records: &[SalesRecord]) -> Vec<i32> {
    let mut years: Vec<i32> = records.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();
    years
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::tx;

    #[test]
    fn every_row_gets_exactly_one_season() {
        let txs: Vec<Transaction> = (1..=12).map(|m| tx("O1", 2023, m, 10)).collect();
        let records = enrich(txs).unwrap();
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].season, Season::Winter);
        assert_eq!(records[5].season, Season::Summer);
        assert_eq!(records[11].season, Season::Winter);
        assert!(records.iter().all(|r| r.year == 2023));
        assert_eq!(records[3].month, 4);
    }

    #[test]
    fn years_are_sorted_and_distinct() {
        let records = enrich(vec![
            tx("O1", 2023, 1, 1),
            tx("O2", 2021, 5, 1),
            tx("O3", 2023, 7, 1),
        ])
        .unwrap();
        assert_eq!(years_present(&records), vec![2021, 2023]);
    }
}

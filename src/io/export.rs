//! Export transactions to CSV in the ingest schema.
//!
//! Used by the synthetic data generator; the output reads back through
//! `ingest::load_transactions` unchanged.

use std::path::Path;

use crate::domain::Transaction;
use crate::error::AppError;

const HEADER: [&str; 11] = [
    "Order_ID",
    "Order_Date",
    "Product",
    "Category",
    "Customer_ID",
    "Customer_Type",
    "Region",
    "Quantity",
    "Unit_Price",
    "Total_Price",
    "Discount",
];

/// Write transactions to a CSV file, replacing any existing file.
pub fn write_transactions_csv(path: &Path, transactions: &[Transaction]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display())))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    let write_err = |e: csv::Error| AppError::new(2, format!("Failed to write CSV '{}': {e}", path.display()));

    writer.write_record(HEADER).map_err(write_err)?;
    for tx in transactions {
        writer
            .write_record([
                tx.order_id.clone(),
                tx.date.format("%Y-%m-%d").to_string(),
                tx.product.clone(),
                tx.category.clone(),
                tx.customer_id.clone(),
                tx.customer_type.clone(),
                tx.region.clone(),
                tx.quantity.to_string(),
                tx.unit_price.map(|p| format!("{p:.2}")).unwrap_or_default(),
                format!("{:.2}", tx.total_price),
                tx.discount.to_string(),
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiscountLevel;
    use crate::io::ingest::load_transactions;
    use chrono::NaiveDate;

    #[test]
    fn exported_rows_read_back() {
        let tx = Transaction {
            order_id: "O1".into(),
            date: NaiveDate::from_ymd_opt(2022, 11, 3).unwrap(),
            product: "Red Bull".into(),
            category: "Soft Drinks".into(),
            customer_id: "C9".into(),
            customer_type: "B2B".into(),
            region: "Hamburg".into(),
            quantity: 40,
            unit_price: Some(1.95),
            total_price: 70.2,
            discount: DiscountLevel::from_basis_points(1000),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sales.csv");

        write_transactions_csv(&path, std::slice::from_ref(&tx)).unwrap();
        let back = load_transactions(&path).unwrap();
        assert_eq!(back, vec![tx]);
    }
}

//! CSV ingest of sales line items.
//!
//! This module turns a sales CSV into a `Vec<Transaction>`:
//! - **Strict schema**: every required column must exist (exit code 2, all
//!   missing columns named at once)
//! - **Strict rows**: the first unparseable field fails the run with its line
//!   number and column (exit code 3); rows are never skipped
//! - **Forgiving headers**: names are trimmed, BOM-stripped, and matched
//!   case-insensitively

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::{DiscountLevel, Transaction};
use crate::error::AppError;

/// Required columns, by normalized header name.
const REQUIRED_COLUMNS: [&str; 10] = [
    "order_id",
    "order_date",
    "product",
    "category",
    "customer_id",
    "customer_type",
    "region",
    "quantity",
    "total_price",
    "discount",
];

/// Accepted alternative header names, `(alias, canonical)`.
const COLUMN_ALIASES: [(&str, &str); 1] = [("date", "order_date")];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Load every transaction from a CSV file.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let transactions = read_transactions(file)?;
    debug!(path = %path.display(), rows = transactions.len(), "ingest complete");
    Ok(transactions)
}

/// Parse transactions from any CSV reader.
pub fn read_transactions<R: Read>(input: R) -> Result<Vec<Transaction>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut transactions = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(3, format!("Line {line}: CSV parse error: {e}")))?;
        let tx = parse_row(&record, &header_map)
            .map_err(|e| AppError::new(3, format!("Line {line}: {e}")))?;
        transactions.push(tx);
    }

    if transactions.is_empty() {
        return Err(AppError::new(3, "The input CSV has no data rows."));
    }
    Ok(transactions)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    for (alias, canonical) in COLUMN_ALIASES {
        if !map.contains_key(canonical) {
            if let Some(&idx) = map.get(alias) {
                map.insert(canonical.to_string(), idx);
            }
        }
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header_map.contains_key(**c))
        .map(|c| format!("`{c}`"))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Transaction, String> {
    let text = |name: &str| get_required(record, header_map, name).map(str::to_string);

    let discount_raw = get_required(record, header_map, "discount")?;
    let discount = parse_f64(discount_raw, "discount").and_then(|rate| {
        DiscountLevel::from_rate(rate).ok_or_else(|| {
            format!("Invalid `discount` rate '{discount_raw}' (expected a non-negative rate in whole basis points).")
        })
    })?;

    let unit_price = get_optional(record, header_map, "unit_price")
        .map(|s| parse_f64(s, "unit_price"))
        .transpose()?;

    Ok(Transaction {
        order_id: text("order_id")?,
        date: parse_date(get_required(record, header_map, "order_date")?)?,
        product: text("product")?,
        category: text("category")?,
        customer_id: text("customer_id")?,
        customer_type: text("customer_type")?,
        region: text("region")?,
        quantity: parse_quantity(get_required(record, header_map, "quantity")?)?,
        unit_price,
        total_price: parse_f64(get_required(record, header_map, "total_price")?, "total_price")?,
        discount,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid `order_date` '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY, DD-MM-YYYY, YYYY-MM-DD HH:MM:SS."
    ))
}

/// Integer quantities; `"3.0"` is accepted, `"3.5"` is not.
fn parse_quantity(s: &str) -> Result<i64, String> {
    if let Ok(q) = s.parse::<i64>() {
        return Ok(q);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid `quantity` '{s}' (expected a whole number).")),
    }
}

fn parse_f64(s: &str, column: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{column}` '{s}' (expected a number).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order_ID,Order_Date,Product,Category,Customer_ID,Customer_Type,Region,Quantity,Unit_Price,Total_Price,Discount";

    fn read(body: &str) -> Result<Vec<Transaction>, AppError> {
        read_transactions(format!("{HEADER}\n{body}").as_bytes())
    }

    #[test]
    fn parses_a_well_formed_row() {
        let txs = read("O1,2023-06-15,Coca-Cola,Soft Drinks,C7,B2B,Bayern,12,1.5,17.1,0.05\n").unwrap();
        assert_eq!(txs.len(), 1);
        let tx = &txs[0];
        assert_eq!(tx.order_id, "O1");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
        assert_eq!(tx.customer_type, "B2B");
        assert_eq!(tx.quantity, 12);
        assert_eq!(tx.unit_price, Some(1.5));
        assert_eq!(tx.discount.basis_points(), 500);
    }

    #[test]
    fn headers_are_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}order_id,DATE,product,category,customer_id,customer_type,region,quantity,total_price,discount\n\
                   O1,15/06/2023,Water,Water,C1,B2C,Berlin,3.0,3.0,0\n";
        let txs = read_transactions(csv.as_bytes()).unwrap();
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
        assert_eq!(txs[0].quantity, 3);
        assert_eq!(txs[0].unit_price, None);
        assert!(txs[0].discount.is_baseline());
    }

    #[test]
    fn accepts_all_date_formats() {
        for s in ["2023-01-02", "2023/01/02", "02/01/2023", "02-01-2023", "2023-01-02 13:45:00"] {
            assert_eq!(parse_date(s).unwrap(), NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(), "{s}");
        }
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let err = read_transactions("Order_ID,Product\nO1,Cola\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`order_date`"));
        assert!(err.message().contains("`discount`"));
        assert!(!err.message().contains("`product`"));
    }

    #[test]
    fn bad_date_names_line_and_column() {
        let err = read(
            "O1,2023-06-15,Cola,Soft Drinks,C1,B2C,North,1,2,2,0\n\
             O2,someday,Cola,Soft Drinks,C1,B2C,North,1,2,2,0\n",
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().starts_with("Line 3:"), "{}", err.message());
        assert!(err.message().contains("order_date"));
    }

    #[test]
    fn fractional_quantity_is_rejected() {
        let err = read("O1,2023-06-15,Cola,Soft Drinks,C1,B2C,North,2.5,2,5,0\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("quantity"));
    }

    #[test]
    fn sub_basis_point_discount_names_line_and_column() {
        let err = read(
            "O1,2023-06-15,Cola,Soft Drinks,C1,B2C,North,1,2,2,0\n\
             O2,2023-06-15,Cola,Soft Drinks,C1,B2C,North,1,2,2,0.00004\n",
        )
        .unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().starts_with("Line 3:"), "{}", err.message());
        assert!(err.message().contains("discount"));
    }

    #[test]
    fn empty_input_is_a_data_error() {
        let err = read("").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_transactions(&dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

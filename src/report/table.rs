//! In-memory report tables and their CSV rendering.

use crate::error::AppError;

/// One value in a report table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Render the cell as it appears in CSV and console output.
    ///
    /// Floats use Rust's shortest round-trip representation (`12.5`, `100.0`),
    /// which keeps output byte-stable across runs.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{v:?}"),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// A named, rectangular report.
///
/// `name` doubles as the file stem used by file-backed sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(name: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), AppError> {
        if row.len() != self.columns.len() {
            return Err(AppError::new(
                4,
                format!(
                    "Table '{}' expects {} cells per row, got {}.",
                    self.name,
                    self.columns.len(),
                    row.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Numeric values of one column (non-numeric cells are skipped).
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|r| r[idx].as_f64()).collect())
    }

    /// Render the table as CSV (header row first).
    pub fn to_csv(&self) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV header for '{}': {e}", self.name)))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(Cell::render))
                .map_err(|e| AppError::new(2, format!("Failed to write CSV row for '{}': {e}", self.name)))?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::new(2, format!("Failed to flush CSV for '{}': {e}", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_fields_with_commas() {
        let mut t = Table::new("demo", ["Name", "Qty", "Share"]);
        t.push_row(vec![Cell::text("Juice, Orange"), Cell::Int(12), Cell::Float(12.5)])
            .unwrap();
        t.push_row(vec![Cell::text("Cola"), Cell::Int(3), Cell::Float(0.25)]).unwrap();

        let csv = String::from_utf8(t.to_csv().unwrap()).unwrap();
        assert_eq!(csv, "Name,Qty,Share\n\"Juice, Orange\",12,12.5\nCola,3,0.25\n");
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(Cell::Float(100.0).render(), "100.0");
        assert_eq!(Cell::Float(0.05).render(), "0.05");
    }

    #[test]
    fn push_row_checks_width() {
        let mut t = Table::new("demo", ["A", "B"]);
        assert!(t.push_row(vec![Cell::Int(1)]).is_err());
    }
}

//! Formatted terminal output.
//!
//! We keep formatting code in one place so the analysis passes stay free of
//! printing, and output changes are localized.

use crate::report::table::Table;

/// Format the first `max_rows` rows of a table as an aligned text block.
pub fn format_table(table: &Table, max_rows: usize) -> String {
    let shown: Vec<Vec<String>> = table
        .rows
        .iter()
        .take(max_rows)
        .map(|row| row.iter().map(|c| c.render()).collect())
        .collect();

    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format!("=== {} ({} rows) ===\n", table.name, table.rows.len()));
    out.push_str(&format_line(&table.columns, &widths));
    out.push_str(&format!(
        "{}\n",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    ));
    for row in &shown {
        out.push_str(&format_line(row, &widths));
    }
    if table.rows.len() > shown.len() {
        out.push_str(&format!("... {} more rows\n", table.rows.len() - shown.len()));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{c:<w$}", w = *w))
        .collect();
    format!("{}\n", parts.join(" | ").trim_end())
}

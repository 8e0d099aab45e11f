//! Run manifest (`summary.json`).
//!
//! The manifest is the machine-readable digest of one run:
//! - where the data came from and how much of it there was
//! - the loyalty thresholds and discount t-test verdicts
//! - every artifact file written next to it

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::error::AppError;

pub const MANIFEST_FILE_NAME: &str = "summary.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub input: PathBuf,
    pub rows: usize,
    pub years: Vec<i32>,
    pub target_year: i32,
    pub alpha: f64,
    pub repetition_q1: f64,
    pub repetition_q3: f64,
    pub discount_tests: Vec<DiscountTestSummary>,
    /// File names relative to the output directory.
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountTestSummary {
    pub discount: f64,
    pub t_stat: f64,
    pub p_value: f64,
    pub significant: bool,
}

impl RunManifest {
    pub fn from_run(input: &Path, alpha: f64, run: &RunOutput, artifacts: &[PathBuf]) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            input: input.to_path_buf(),
            rows: run.rows,
            years: run.years.clone(),
            target_year: run.target_year,
            alpha,
            repetition_q1: run.loyalty.thresholds.q1,
            repetition_q3: run.loyalty.thresholds.q3,
            discount_tests: run
                .discount
                .verdicts
                .iter()
                .map(|v| DiscountTestSummary {
                    discount: v.level.rate(),
                    t_stat: v.test.t_stat,
                    p_value: v.test.p_value,
                    significant: v.significant,
                })
                .collect(),
            artifacts: artifacts
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Write `summary.json` into `dir`, returning its path.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> Result<PathBuf, AppError> {
    let path = dir.join(MANIFEST_FILE_NAME);
    let file = File::create(&path)
        .map_err(|e| AppError::new(2, format!("Failed to create manifest '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::new(2, format!("Failed to write manifest JSON: {e}")))?;
    Ok(path)
}

pub fn read_manifest(path: &Path) -> Result<RunManifest, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open manifest '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid manifest JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_survives_a_write_read_cycle() {
        let manifest = RunManifest {
            tool: "sales-insights".to_string(),
            input: PathBuf::from("data/sales.csv"),
            rows: 42,
            years: vec![2022, 2023],
            target_year: 2023,
            alpha: 0.05,
            repetition_q1: 2.0,
            repetition_q3: 5.5,
            discount_tests: vec![DiscountTestSummary {
                discount: 0.1,
                t_stat: -3.2,
                p_value: 0.012,
                significant: true,
            }],
            artifacts: vec!["seasonal_sales_analysis.csv".to_string()],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), &manifest).unwrap();
        assert_eq!(path.file_name().unwrap(), MANIFEST_FILE_NAME);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"target_year\": 2023"));
        assert_eq!(read_manifest(&path).unwrap(), manifest);
    }
}

//! Report sinks: where finished tables and charts go.
//!
//! The analysis pipeline only ever talks to `ReportSink`. Front-ends decide
//! whether tables land in files, on the console, in memory, or all of them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AppError;
use crate::plot::{Chart, render_svg};
use crate::report::{Table, format_table};

pub trait ReportSink {
    fn table(&mut self, table: &Table) -> Result<(), AppError>;
    fn chart(&mut self, chart: &Chart) -> Result<(), AppError>;
}

/// Writes `<dir>/<name>.csv` for tables and `<dir>/<name>.svg` for charts,
/// overwriting existing files.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the output directory (and parents) if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::new(2, format!("Failed to create output directory '{}': {e}", dir.display())))?;
        Ok(Self { dir, written: Vec::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in write order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn write(&mut self, file_name: String, bytes: &[u8]) -> Result<(), AppError> {
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)
            .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))?;
        info!(path = %path.display(), "wrote artifact");
        self.written.push(path);
        Ok(())
    }
}

impl ReportSink for DirectorySink {
    fn table(&mut self, table: &Table) -> Result<(), AppError> {
        let bytes = table.to_csv()?;
        self.write(format!("{}.csv", table.name), &bytes)
    }

    fn chart(&mut self, chart: &Chart) -> Result<(), AppError> {
        let svg = render_svg(chart)?;
        self.write(format!("{}.svg", chart.name), svg.as_bytes())
    }
}

/// Prints the first `rows` rows of every table to stdout.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    rows: usize,
}

impl ConsoleSink {
    /// `rows == 0` disables the preview.
    pub fn new(rows: usize) -> Self {
        Self { rows }
    }
}

impl ReportSink for ConsoleSink {
    fn table(&mut self, table: &Table) -> Result<(), AppError> {
        if self.rows > 0 {
            println!("{}", format_table(table, self.rows));
        }
        Ok(())
    }

    fn chart(&mut self, chart: &Chart) -> Result<(), AppError> {
        info!(chart = %chart.name, title = %chart.title, "chart ready");
        Ok(())
    }
}

/// Keeps every table and chart in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: Vec<Table>,
    pub charts: Vec<Chart>,
}

impl MemorySink {
    pub fn table_named(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl ReportSink for MemorySink {
    fn table(&mut self, table: &Table) -> Result<(), AppError> {
        self.tables.push(table.clone());
        Ok(())
    }

    fn chart(&mut self, chart: &Chart) -> Result<(), AppError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

/// Fans every table and chart out to several sinks, in insertion order.
/// The first failing sink stops the fan-out.
#[derive(Default)]
pub struct SinkSet<'a> {
    sinks: Vec<&'a mut dyn ReportSink>,
}

impl<'a> SinkSet<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a mut dyn ReportSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ReportSink for SinkSet<'_> {
    fn table(&mut self, table: &Table) -> Result<(), AppError> {
        for sink in &mut self.sinks {
            sink.table(table)?;
        }
        Ok(())
    }

    fn chart(&mut self, chart: &Chart) -> Result<(), AppError> {
        for sink in &mut self.sinks {
            sink.chart(chart)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{ChartSpec, ScatterChart};
    use crate::report::Cell;

    fn demo_table() -> Table {
        let mut t = Table::new("demo_table", ["Season", "Quantity"]);
        t.push_row(vec![Cell::text("Winter"), Cell::Int(30)]).unwrap();
        t
    }

    fn demo_chart() -> Chart {
        Chart {
            name: "demo_chart".to_string(),
            title: "Demo".to_string(),
            spec: ChartSpec::Scatter(ScatterChart {
                x_label: "x".to_string(),
                y_label: "y".to_string(),
                points: vec![(1.0, 2.0), (2.0, 1.0)],
            }),
        }
    }

    #[test]
    fn directory_sink_writes_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("reports");
        let mut sink = DirectorySink::new(&out).unwrap();

        sink.table(&demo_table()).unwrap();
        sink.chart(&demo_chart()).unwrap();
        sink.table(&demo_table()).unwrap();

        let csv = fs::read_to_string(out.join("demo_table.csv")).unwrap();
        assert_eq!(csv, "Season,Quantity\nWinter,30\n");
        let svg = fs::read_to_string(out.join("demo_chart.svg")).unwrap();
        assert!(svg.contains("<svg"));
        assert_eq!(sink.written().len(), 3);
    }

    #[test]
    fn sink_set_fans_out_to_every_sink() {
        let mut a = MemorySink::default();
        let mut b = MemorySink::default();
        {
            let mut set = SinkSet::new().with(&mut a).with(&mut b);
            set.table(&demo_table()).unwrap();
            set.chart(&demo_chart()).unwrap();
        }
        assert_eq!(a.tables.len(), 1);
        assert_eq!(b.charts.len(), 1);
        assert!(b.table_named("demo_table").is_some());
        assert_eq!(a.charts[0].name, "demo_chart");
    }

    #[test]
    fn chart_errors_propagate() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(tmp.path()).unwrap();
        let mut chart = demo_chart();
        chart.spec = ChartSpec::Scatter(ScatterChart {
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            points: Vec::new(),
        });
        assert_eq!(sink.chart(&chart).unwrap_err().exit_code(), 5);
        assert!(sink.written().is_empty());
    }
}

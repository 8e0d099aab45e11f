//! Chart descriptions and rendering.
//!
//! Analysis passes only build render-only chart descriptions (`Chart`); all
//! series, slices and labels are computed outside the renderer. Rendering to
//! SVG lives in `svg`, so the descriptions can be inspected in tests without
//! touching the drawing code.

pub mod svg;

pub use svg::render_svg;

/// A named chart. `name` doubles as the file stem used by file-backed sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub name: String,
    pub title: String,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    /// A single pie with percentage labels.
    Pie(PieChart),
    /// Several pies arranged side by side, each with its own title.
    PieGrid(Vec<PieChart>),
    /// One line (with markers) per series.
    Lines(LineChart),
    Scatter(ScatterChart),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
    /// Decimals shown in the percentage labels.
    pub label_decimals: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
}

impl PieChart {
    pub fn total(&self) -> f64 {
        self.slices.iter().map(|s| s.value).sum()
    }
}

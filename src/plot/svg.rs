//! Plotters-powered SVG rendering for chart descriptions.
//!
//! We render with Plotters' SVG backend into an in-memory string. Text is
//! emitted as `<text>` elements, so no system fonts are needed and the output
//! is deterministic for a given chart.

use std::f64::consts::PI;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::AppError;
use crate::plot::{Chart, ChartSpec, LineChart, PieChart, ScatterChart};

type DrawResult = Result<(), Box<dyn std::error::Error>>;
type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FONT: &str = "sans-serif";

/// Render a chart description to an SVG document.
pub fn render_svg(chart: &Chart) -> Result<String, AppError> {
    validate(chart)?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, canvas_size(&chart.spec)).into_drawing_area();
        draw_chart(&root, chart)
            .map_err(|e| AppError::new(5, format!("Failed to render chart '{}': {e}", chart.name)))?;
    }
    Ok(svg)
}

fn canvas_size(spec: &ChartSpec) -> (u32, u32) {
    match spec {
        ChartSpec::Pie(_) => (800, 500),
        ChartSpec::PieGrid(pies) => (420 * pies.len().max(1) as u32, 460),
        ChartSpec::Lines(_) => (1000, 500),
        ChartSpec::Scatter(_) => (1200, 600),
    }
}

fn validate(chart: &Chart) -> Result<(), AppError> {
    let invalid = |reason: &str| AppError::new(5, format!("Cannot render chart '{}': {reason}", chart.name));
    let check_pie = |pie: &PieChart| {
        let total = pie.total();
        if pie.slices.is_empty() {
            Err(invalid("pie has no slices"))
        } else if pie.slices.iter().any(|s| !s.value.is_finite() || s.value < 0.0) {
            Err(invalid("pie slices must be finite and non-negative"))
        } else if !(total.is_finite() && total > 0.0) {
            Err(invalid("pie total is zero"))
        } else {
            Ok(())
        }
    };

    match &chart.spec {
        ChartSpec::Pie(pie) => check_pie(pie),
        ChartSpec::PieGrid(pies) => {
            if pies.is_empty() {
                return Err(invalid("pie grid has no panels"));
            }
            pies.iter().try_for_each(check_pie)
        }
        ChartSpec::Lines(lines) => {
            if lines.series.iter().all(|s| s.points.is_empty()) {
                return Err(invalid("line chart has no points"));
            }
            check_points(lines.series.iter().flat_map(|s| s.points.iter()), &invalid)
        }
        ChartSpec::Scatter(scatter) => {
            if scatter.points.is_empty() {
                return Err(invalid("scatter chart has no points"));
            }
            check_points(scatter.points.iter(), &invalid)
        }
    }
}

fn check_points<'a>(
    mut points: impl Iterator<Item = &'a (f64, f64)>,
    invalid: impl Fn(&str) -> AppError,
) -> Result<(), AppError> {
    if points.any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return Err(invalid("non-finite coordinates"));
    }
    Ok(())
}

fn draw_chart(root: &Area<'_>, chart: &Chart) -> DrawResult {
    root.fill(&WHITE)?;

    match &chart.spec {
        ChartSpec::Pie(pie) => {
            let area = root.titled(&chart.title, (FONT, 22))?;
            draw_pie(&area, pie)?;
        }
        ChartSpec::PieGrid(pies) => {
            let area = root.titled(&chart.title, (FONT, 22))?;
            for (panel, pie) in area.split_evenly((1, pies.len())).iter().zip(pies) {
                let panel = panel.titled(&pie.title, (FONT, 16))?;
                draw_pie(&panel, pie)?;
            }
        }
        ChartSpec::Lines(lines) => draw_lines(root, &chart.title, lines)?,
        ChartSpec::Scatter(scatter) => draw_scatter(root, &chart.title, scatter)?,
    }

    root.present()?;
    Ok(())
}

fn draw_pie(area: &Area<'_>, pie: &PieChart) -> DrawResult {
    let (w, h) = area.dim_in_pixel();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.34;
    let total = pie.total();

    // Start at twelve o'clock and sweep clockwise.
    let mut start = -PI / 2.0;
    for (i, slice) in pie.slices.iter().enumerate() {
        let sweep = slice.value / total * 2.0 * PI;
        let color = Palette99::pick(i).to_rgba();

        let steps = (sweep / (2.0 * PI) * 180.0).ceil().max(2.0) as usize;
        let mut wedge = Vec::with_capacity(steps + 2);
        wedge.push(polar(cx, cy, 0.0, start));
        for k in 0..=steps {
            wedge.push(polar(cx, cy, radius, start + sweep * k as f64 / steps as f64));
        }
        area.draw(&Polygon::new(wedge, color.filled()))?;

        let mid = start + sweep / 2.0;
        let pct = slice.value / total * 100.0;
        area.draw(&Text::new(
            format!("{pct:.prec$}%", prec = pie.label_decimals),
            polar(cx, cy, radius * 0.62, mid),
            centered(13),
        ))?;
        area.draw(&Text::new(
            slice.label.clone(),
            polar(cx, cy, radius * 1.2, mid),
            centered(14),
        ))?;

        start += sweep;
    }
    Ok(())
}

fn draw_lines(root: &Area<'_>, title: &str, lines: &LineChart) -> DrawResult {
    let points = lines.series.iter().flat_map(|s| s.points.iter().copied());
    let ((x0, x1), (y0, y1)) = bounds(points);

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(lines.x_label.as_str())
        .y_desc(lines.y_label.as_str())
        .x_labels(12)
        .x_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    for (i, series) in lines.series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(2)))?
            .label(format!("{} {}", lines.legend_title, series.name))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(series.points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

fn draw_scatter(root: &Area<'_>, title: &str, scatter: &ScatterChart) -> DrawResult {
    let ((x0, x1), (y0, y1)) = bounds(scatter.points.iter().copied());

    let mut chart = ChartBuilder::on(root)
        .caption(title, (FONT, 22).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(scatter.x_label.as_str())
        .y_desc(scatter.y_label.as_str())
        .draw()?;

    let color = Palette99::pick(0).to_rgba();
    chart.draw_series(
        scatter
            .points
            .iter()
            .map(|&p| Circle::new(p, 5, color.mix(0.7).filled())),
    )?;
    chart.draw_series(scatter.points.iter().map(|&p| Circle::new(p, 5, &BLACK)))?;

    Ok(())
}

/// Axis bounds: x padded by half a unit, y from zero (or the minimum) up to 110% of the max.
fn bounds(points: impl Iterator<Item = (f64, f64)>) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(x_min.is_finite() && x_max.is_finite()) {
        return ((0.0, 1.0), (0.0, 1.0));
    }

    let y_lo = y_min.min(0.0);
    let mut y_hi = y_max * 1.1;
    if y_hi <= y_lo {
        y_hi = y_lo + 1.0;
    }
    ((x_min - 0.5, x_max + 0.5), (y_lo, y_hi))
}

fn polar(cx: f64, cy: f64, r: f64, angle: f64) -> (i32, i32) {
    (
        (cx + r * angle.cos()).round() as i32,
        (cy + r * angle.sin()).round() as i32,
    )
}

fn centered(size: i32) -> TextStyle<'static> {
    (FONT, size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{PieSlice, Series};

    fn season_pie() -> Chart {
        Chart {
            name: "seasonal_sales_distribution".to_string(),
            title: "Sales Distribution by Season".to_string(),
            spec: ChartSpec::Pie(PieChart {
                title: String::new(),
                slices: vec![
                    PieSlice { label: "Winter".to_string(), value: 30.0 },
                    PieSlice { label: "Summer".to_string(), value: 90.0 },
                ],
                label_decimals: 1,
            }),
        }
    }

    #[test]
    fn pie_renders_labels_and_percentages() {
        let svg = render_svg(&season_pie()).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Winter"));
        assert!(svg.contains("75.0%"));
        assert!(svg.contains("25.0%"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let chart = season_pie();
        assert_eq!(render_svg(&chart).unwrap(), render_svg(&chart).unwrap());
    }

    #[test]
    fn line_chart_renders_one_legend_entry_per_series() {
        let chart = Chart {
            name: "monthly_sales_trend".to_string(),
            title: "Monthly Sales Trends Over Different Years".to_string(),
            spec: ChartSpec::Lines(LineChart {
                x_label: "Month".to_string(),
                y_label: "Sales (in thousands)".to_string(),
                legend_title: "Year".to_string(),
                series: vec![
                    Series { name: "2022".to_string(), points: vec![(1.0, 3.0), (2.0, 4.0)] },
                    Series { name: "2023".to_string(), points: vec![(1.0, 5.0), (2.0, 2.0)] },
                ],
            }),
        };
        let svg = render_svg(&chart).unwrap();
        assert!(svg.contains("Year 2022"));
        assert!(svg.contains("Year 2023"));
    }

    #[test]
    fn zero_total_pie_is_rejected() {
        let mut chart = season_pie();
        if let ChartSpec::Pie(pie) = &mut chart.spec {
            for s in &mut pie.slices {
                s.value = 0.0;
            }
        }
        assert_eq!(render_svg(&chart).unwrap_err().exit_code(), 5);
    }

    #[test]
    fn empty_scatter_is_rejected() {
        let chart = Chart {
            name: "empty".to_string(),
            title: "Empty".to_string(),
            spec: ChartSpec::Scatter(ScatterChart {
                x_label: "x".to_string(),
                y_label: "y".to_string(),
                points: Vec::new(),
            }),
        };
        assert!(render_svg(&chart).is_err());
    }
}

//! Static Chart Renderer
//! Writes the diagnostic PNG charts with plotters.
//!
//! Charts:
//! 1. Missing values per column (bar chart, only columns with gaps)
//! 2. Correlation heatmap (coolwarm scale with colour bar)
//! 3. Distribution of the first numeric column (histogram + KDE curve)

use crate::data::{CorrelationMatrix, MissingCount, NumericColumn};
use crate::stats::StatsCalculator;
use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const MISSING_VALUES_FILE: &str = "missing_values.png";
pub const CORRELATION_HEATMAP_FILE: &str = "correlation_heatmap.png";
pub const DISTRIBUTION_FILE: &str = "distribution.png";

const MISSING_VALUES_SIZE: (u32, u32) = (1000, 600);
const HEATMAP_SIZE: (u32, u32) = (1000, 800);
const HEATMAP_LEGEND_WIDTH: u32 = 140;
const DISTRIBUTION_SIZE: (u32, u32) = (800, 600);
const KDE_POINTS: usize = 200;

// Colors
const BAR: RGBColor = RGBColor(31, 119, 180);
const BAR_EDGE: RGBColor = RGBColor(20, 78, 118);
const COOL: RGBColor = RGBColor(59, 76, 192); // -1
const NEUTRAL: RGBColor = RGBColor(221, 221, 221); // 0
const WARM: RGBColor = RGBColor(180, 4, 38); // +1
/// Coolwarm control points at -1, -0.5, 0, 0.5 and 1.
const COOLWARM_STOPS: [RGBColor; 5] = [
    COOL,
    RGBColor(141, 176, 254),
    NEUTRAL,
    RGBColor(244, 154, 123),
    WARM,
];
const UNDEFINED: RGBColor = RGBColor(160, 160, 160); // NaN cells
const GRID: RGBColor = RGBColor(200, 200, 200);

type DrawResult = Result<(), Box<dyn StdError>>;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render {}: {}", .path.display(), .message)]
    Render { path: PathBuf, message: String },
}

impl ChartError {
    fn render(path: &Path, err: Box<dyn StdError>) -> Self {
        ChartError::Render {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Bar chart of missing counts. `missing` holds only non-zero columns.
    pub fn render_missing_values(path: &Path, missing: &[&MissingCount]) -> Result<(), ChartError> {
        Self::draw_missing_values(path, missing).map_err(|e| ChartError::render(path, e))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    pub fn render_correlation_heatmap(path: &Path, matrix: &CorrelationMatrix) -> Result<(), ChartError> {
        Self::draw_correlation_heatmap(path, matrix).map_err(|e| ChartError::render(path, e))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    pub fn render_distribution(path: &Path, column: &NumericColumn) -> Result<(), ChartError> {
        Self::draw_distribution(path, column).map_err(|e| ChartError::render(path, e))?;
        info!("wrote {}", path.display());
        Ok(())
    }

    /// Map a correlation in [-1, 1] onto the diverging coolwarm scale.
    pub fn coolwarm(value: f64) -> RGBColor {
        if !value.is_finite() {
            return UNDEFINED;
        }

        // Position along the stops, 0.0 at -1 and 4.0 at +1.
        let pos = (value.clamp(-1.0, 1.0) + 1.0) * 2.0;
        let segment = (pos.floor() as usize).min(COOLWARM_STOPS.len() - 2);
        let frac = pos - segment as f64;
        let (from, to) = (COOLWARM_STOPS[segment], COOLWARM_STOPS[segment + 1]);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

        RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
    }

    /// Room for rotated category labels.
    fn label_area(labels: &[String]) -> u32 {
        let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
        (longest * 8 + 20).clamp(40, 240)
    }

    fn draw_missing_values(path: &Path, missing: &[&MissingCount]) -> DrawResult {
        let root = BitMapBackend::new(path, MISSING_VALUES_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let labels: Vec<String> = missing.iter().map(|m| m.column.clone()).collect();
        let max = missing.iter().map(|m| m.count).max().unwrap_or(0) as u32;
        let y_max = max + max / 10 + 1;

        let mut chart = ChartBuilder::on(&root)
            .caption("Missing Values per Column", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(Self::label_area(&labels))
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(), 0u32..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID)
            .light_line_style(WHITE)
            .x_labels(labels.len() + 1)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .x_label_formatter(&|v: &SegmentValue<u32>| match v {
                SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc("Count")
            .axis_desc_style(("sans-serif", 16))
            .draw()?;

        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR.filled())
                .margin(12)
                .data(missing.iter().enumerate().map(|(i, m)| (i as u32, m.count as u32))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_correlation_heatmap(path: &Path, matrix: &CorrelationMatrix) -> DrawResult {
        let root = BitMapBackend::new(path, HEATMAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let (main, legend) = root.split_horizontally(HEATMAP_SIZE.0 - HEATMAP_LEGEND_WIDTH);

        let n = matrix.size() as i32;
        let names = &matrix.names;
        let label_area = Self::label_area(names);

        let mut chart = ChartBuilder::on(&main)
            .caption("Correlation Heatmap", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(label_area)
            .y_label_area_size(label_area)
            .build_cartesian_2d(0i32..n, n..0i32)?;

        // Labels sit on cell edges; shift them to the cell centres.
        let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
        let half_cell_x = plot_w as i32 / (2 * n.max(1));
        let half_cell_y = plot_h as i32 / (2 * n.max(1));

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(names.len() + 1)
            .y_labels(names.len() + 1)
            .x_label_offset(half_cell_x)
            .y_label_offset(half_cell_y)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .y_label_style(("sans-serif", 14))
            .x_label_formatter(&|v: &i32| Self::name_at(names, *v))
            .y_label_formatter(&|v: &i32| Self::name_at(names, *v))
            .draw()?;

        chart.draw_series(
            (0..n)
                .flat_map(|row| (0..n).map(move |col| (row, col)))
                .map(|(row, col)| {
                    let value = matrix.get(row as usize, col as usize);
                    Rectangle::new([(col, row), (col + 1, row + 1)], Self::coolwarm(value).filled())
                }),
        )?;

        Self::draw_colour_bar(&legend)?;

        root.present()?;
        Ok(())
    }

    fn name_at(names: &[String], index: i32) -> String {
        usize::try_from(index)
            .ok()
            .and_then(|i| names.get(i))
            .cloned()
            .unwrap_or_default()
    }

    fn draw_colour_bar(area: &DrawingArea<BitMapBackend<'_>, Shift>) -> DrawResult {
        let steps = 100;
        let step = 2.0 / steps as f64;

        let mut bar = ChartBuilder::on(area)
            .margin_top(80)
            .margin_bottom(80)
            .margin_left(10)
            .margin_right(10)
            .right_y_label_area_size(50)
            .build_cartesian_2d(0f64..1f64, -1f64..1f64)?;

        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(5)
            .y_label_formatter(&|v: &f64| format!("{v:.1}"))
            .draw()?;

        bar.draw_series((0..steps).map(|i| {
            let lo = -1.0 + i as f64 * step;
            Rectangle::new([(0.0, lo), (1.0, lo + step)], Self::coolwarm(lo + step / 2.0).filled())
        }))?;

        Ok(())
    }

    fn draw_distribution(path: &Path, column: &NumericColumn) -> DrawResult {
        // Bin first so unbinnable data leaves no half-drawn file behind.
        let values = column.present();
        let hist = StatsCalculator::histogram(&values)
            .map_err(|e| format!("column {}: {}", column.name, e))?;
        let lo = hist.edges[0];
        let hi = hist.edges[hist.edges.len() - 1];

        // Density scaled to counts so it overlays the bars.
        let scale = values.len() as f64 * hist.bin_width();
        let kde: Vec<(f64, f64)> = StatsCalculator::kde(&values, lo, hi, KDE_POINTS)
            .into_iter()
            .map(|(x, d)| (x, d * scale))
            .collect();
        if kde.is_empty() && !values.is_empty() {
            warn!("column {} has zero variance; skipping density estimate", column.name);
        }

        let kde_max = kde.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        let y_top = (hist.max_count() as f64).max(kde_max).max(1.0) * 1.1;
        let pad = (hi - lo) * 0.05;

        let root = BitMapBackend::new(path, DISTRIBUTION_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Distribution of {}", column.name), ("sans-serif", 24))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d((lo - pad)..(hi + pad), 0f64..y_top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID)
            .light_line_style(WHITE)
            .x_desc(column.name.as_str())
            .y_desc("Count")
            .axis_desc_style(("sans-serif", 16))
            .draw()?;

        let bins: Vec<[(f64, f64); 2]> = hist
            .counts
            .iter()
            .enumerate()
            .map(|(i, &count)| [(hist.edges[i], 0.0), (hist.edges[i + 1], count as f64)])
            .collect();

        chart.draw_series(bins.iter().map(|c| Rectangle::new(*c, BAR.mix(0.5).filled())))?;
        chart.draw_series(bins.iter().map(|c| Rectangle::new(*c, BAR_EDGE.stroke_width(1))))?;

        if !kde.is_empty() {
            chart.draw_series(LineSeries::new(kde, BAR.stroke_width(2)))?;
        }

        root.present()?;
        Ok(())
    }
}

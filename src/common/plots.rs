//! Plotting infrastructure for append-only proof charts
//!
//! This module draws the two-panel figure (proof size and verification time against
//! dictionary size) using the [`plotters`] crate. Both panels share a logarithmic X-axis
//! whose ticks sit exactly on the measured dictionary sizes.
//!
//! The image is drawn into a temporary file next to the destination and renamed into place
//! once complete, so a failed render never leaves a partial PNG behind.

use super::data_structures::ChartSeries;
use crate::config::ChartStyle;
use plotters::coord::combinators::BindKeyPoints;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::io;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to file: {0}")]
    FileSave(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// X-axis description shared by both panels
const X_DESCRIPTION: &str = "Dictionary size";

/// Y-axis description of the proof size panel
const PROOF_SIZE_DESCRIPTION: &str = "Proof size (in KB)";

/// Y-axis description of the verification time panel
const VERIFY_TIME_DESCRIPTION: &str = "Time (in millisecs)";

/// Headroom above the largest value on the Y-axis
const Y_HEADROOM: f64 = 1.1;

/// One of the two stacked panels
struct Panel<'a> {
    caption: Option<&'a str>,
    y_description: &'a str,
    values: &'a [f64],
}

/// Renders the two-panel chart and writes it to `output_path` as a PNG
///
/// # Arguments
/// * `series` - Dictionary sizes with their proof sizes (KB) and verification times (ms)
/// * `log_base` - Base of the logarithmic X-axis
/// * `style` - Figure size, fonts and layout
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If an error occurred; nothing is written to `output_path`
///
/// # Chart Properties
/// * Resolution: `style.width` x `style.height` pixels, split evenly into two panels
/// * X-axis: Logarithmic, ticks at each dictionary size
/// * Top panel: proof size, captioned with `style.title`
/// * Bottom panel: verification time
pub fn render_chart(
    series: &ChartSeries,
    log_base: f64,
    style: &ChartStyle,
    output_path: &Path,
) -> Result<()> {
    validate_series(series)?;
    let series = log_axis_series(series);
    if series.is_empty() {
        return Err(PlotError::InvalidData(
            "No positive dictionary sizes to plot on a logarithmic axis".to_string(),
        ));
    }

    if !(log_base.is_finite() && log_base > 1.0) {
        return Err(PlotError::InvalidData(format!(
            "Log base {} must be greater than 1",
            log_base
        )));
    }

    let directory = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let staging = create_staging_file(directory)?;

    draw_chart(&series, log_base, style, staging.path())?;

    staging
        .persist(output_path)
        .map_err(|e| PlotError::FileSave(e.error))?;

    Ok(())
}

/// Checks that the series can be drawn on a log axis
fn validate_series(series: &ChartSeries) -> Result<()> {
    if series.is_empty() {
        return Err(PlotError::InvalidData("Data cannot be empty".to_string()));
    }

    if series.proof_size_kb.len() != series.len() || series.verify_ms.len() != series.len() {
        return Err(PlotError::InvalidData(format!(
            "Expected {} values per series, got {} proof sizes and {} verification times",
            series.len(),
            series.proof_size_kb.len(),
            series.verify_ms.len()
        )));
    }

    Ok(())
}

/// Creates the file the chart is drawn into before being renamed over the destination
///
/// On unix the file is created with mode `0o666` so the process umask decides the final
/// permissions, the same as for a plain `File::create`.
fn create_staging_file(directory: &Path) -> io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    // Suffix matters: the bitmap encoder picks the image format from the extension.
    builder.prefix(".append-proof-chart-").suffix(".png");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }

    builder.tempfile_in(directory)
}

/// Drops dictionary sizes of zero, which have no position on a logarithmic axis
///
/// Expects a series that already passed [`validate_series`].
fn log_axis_series(series: &ChartSeries) -> ChartSeries {
    let kept: Vec<usize> = (0..series.len())
        .filter(|&index| series.dict_sizes[index] > 0)
        .collect();

    let dropped = series.len() - kept.len();
    if dropped > 0 {
        log::warn!(
            "Leaving out {} point(s) with dictionary size 0 from the logarithmic axis",
            dropped
        );
    }

    ChartSeries {
        dict_sizes: kept.iter().map(|&index| series.dict_sizes[index]).collect(),
        proof_size_kb: kept.iter().map(|&index| series.proof_size_kb[index]).collect(),
        verify_ms: kept.iter().map(|&index| series.verify_ms[index]).collect(),
    }
}

/// Horizontal shift of the x tick labels
///
/// Vertical labels are centred on their tick, so without a shift the tick mark runs through
/// the digits. Moving them by a little over half a line height clears the mark.
fn x_label_offset(style: &ChartStyle) -> i32 {
    if style.rotate_x_labels {
        (style.tick_font_size / 2 + 4) as i32
    } else {
        0
    }
}

/// Computes the X-axis range, padded so the first and last points don't sit on the frame
fn x_range(x_values: &[f64], log_base: f64) -> (f64, f64) {
    let x_min = x_values.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // Ensure x_min >= 1.0 to avoid log(0) domain errors
    let x_min = x_min.max(1.0);
    let x_max = x_max.max(x_min);

    let padding = log_base.powf(0.1);
    (x_min / padding, x_max * padding)
}

/// Computes the upper bound of the Y-axis
fn y_upper_bound(values: &[f64]) -> f64 {
    let y_max = values
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max);

    if y_max > 0.0 {
        y_max * Y_HEADROOM
    } else {
        1.0
    }
}

fn draw_chart(series: &ChartSeries, log_base: f64, style: &ChartStyle, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (style.width, style.height)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let x_values: Vec<f64> = series.dict_sizes.iter().map(|&size| size as f64).collect();

    let panels = root.split_evenly((2, 1));
    let layout = [
        Panel {
            caption: Some(style.title.as_str()),
            y_description: PROOF_SIZE_DESCRIPTION,
            values: &series.proof_size_kb,
        },
        Panel {
            caption: None,
            y_description: VERIFY_TIME_DESCRIPTION,
            values: &series.verify_ms,
        },
    ];

    for (area, panel) in panels.iter().zip(&layout) {
        draw_panel(area, panel, &x_values, log_base, style)?;
    }

    // Ensure everything is properly rendered and saved
    root.present()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel<'_>,
    x_values: &[f64],
    log_base: f64,
    style: &ChartStyle,
) -> Result<()> {
    let family = style.font_family.as_str();
    let (x_min, x_max) = x_range(x_values, log_base);
    let y_max = y_upper_bound(panel.values);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(style.margin)
        .x_label_area_size(style.x_label_area_size)
        .y_label_area_size(style.y_label_area_size);

    if let Some(caption) = panel.caption {
        builder.caption(caption, (family, style.title_font_size as f64));
    }

    let x_spec = (x_min..x_max)
        .log_scale()
        .base(log_base)
        .with_key_points(x_values.to_vec());

    let mut chart_context = builder
        .build_cartesian_2d(x_spec, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    let tick_font = (family, style.tick_font_size as f64).into_font();
    let x_tick_font = if style.rotate_x_labels {
        tick_font.clone().transform(FontTransform::Rotate90)
    } else {
        tick_font.clone()
    };

    chart_context
        .configure_mesh()
        .x_desc(X_DESCRIPTION)
        .y_desc(panel.y_description)
        .axis_desc_style((family, style.label_font_size as f64))
        .x_label_style(x_tick_font)
        .x_label_offset(x_label_offset(style))
        .y_label_style(tick_font)
        .x_labels(x_values.len())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.2}", y))
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let points = x_values
        .iter()
        .zip(panel.values)
        .filter(|(_, y)| y.is_finite())
        .map(|(&x, &y)| (x, y));

    chart_context
        .draw_series(LineSeries::new(points, BLUE.stroke_width(style.line_width)))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    Ok(())
}

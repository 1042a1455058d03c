//! Static Chart Renderer
//! Draws the annotated scatter/regression figure with plotters and writes it
//! out with the `image` crate.
//!
//! Layout:
//! 1. Title across the top
//! 2. Main plot: confidence band, regression line, estimator markers,
//!    GDP-sized scatter points, per-country text labels
//! 3. Legend panel right of the plot area: income-group swatches plus a
//!    GDP size key
//!
//! The whole figure is drawn into an RGB buffer first; the output file is
//! only written once every layer has been drawn, so a failure partway
//! through never leaves a partial image behind.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use image::RgbImage;
use log::info;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{register_font, FontStyle};
use thiserror::Error;

use crate::charts::series::{ChartModel, SizeScale, REGRESSION_COLOR};
use crate::data::PreparedTable;

pub const FIGURE_WIDTH: u32 = 2000;
pub const FIGURE_HEIGHT: u32 = 1500;
const LEGEND_PANEL_WIDTH: u32 = 300;

const CHART_TITLE: &str =
    "Average food loss of grains (2000-2011) versus gross domestic per capita (2011)";
const Y_LABEL: &str = "Average post-harvest loss (in percentage)";
const X_LABEL: &str = "Natural logarithm of countries GDP per capita";

// Font sizes in pixels; the point sizes of the figure text converted at
// 100 dpi.
const TITLE_FONT_PX: i32 = 28;
const AXIS_FONT_PX: i32 = 22;
const TICK_FONT_PX: i32 = 15;
const LABEL_FONT_PX: i32 = 14;
const LEGEND_HEAD_FONT_PX: i32 = 20;
const LEGEND_FONT_PX: i32 = 17;

// Country label offset from its point, in data coordinates.
const LABEL_DX: f64 = 0.05;
const LABEL_DY: f64 = -0.05;

const GRID_COLOR: RGBColor = RGBColor(229, 229, 229);
const SIZE_KEY_COLOR: RGBColor = RGBColor(120, 120, 120);

const LEGEND_MARGIN: i32 = 24;
const LEGEND_ROW_H: i32 = 40;
const LEGEND_SAMPLE_ROW_H: i32 = 52;
const SWATCH_R: i32 = 9;
const MAX_SWATCH_R: i32 = 20;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load the embedded chart font")]
    Font,
    #[error("failed to draw chart: {0}")]
    Draw(String),
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("cannot write {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn draw_err<E>(err: DrawingAreaErrorKind<E>) -> RenderError
where
    E: std::error::Error + Send + Sync,
{
    RenderError::Draw(err.to_string())
}

/// Register the bundled DejaVu Sans face as the figure's sans-serif font.
fn ensure_font() -> Result<(), RenderError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        register_font(
            "sans-serif",
            FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        )
        .is_ok()
    });
    if ok {
        Ok(())
    } else {
        Err(RenderError::Font)
    }
}

/// Render the figure for `table` and write it to `output`.
///
/// Prints one confirmation line to stdout on success. An empty table
/// produces a valid chart with no data layers.
pub fn render(table: &PreparedTable, output: &Path) -> Result<(), RenderError> {
    ensure_font()?;

    let model = ChartModel::from_table(table);
    match &model.fit {
        Some(fit) => info!(
            "regression over {} aggregated points: slope {:.4}, intercept {:.4}",
            model.estimator.len(),
            fit.slope,
            fit.intercept
        ),
        None => info!("not enough distinct points for a regression fit"),
    }

    let mut buffer = vec![0u8; (FIGURE_WIDTH * FIGURE_HEIGHT * 3) as usize];
    draw_figure(table, &model, &mut buffer)?;

    let img = RgbImage::from_raw(FIGURE_WIDTH, FIGURE_HEIGHT, buffer)
        .ok_or_else(|| RenderError::Draw("pixel buffer size mismatch".to_string()))?;
    img.save(output).map_err(|err| match err {
        image::ImageError::IoError(source) => RenderError::FileAccess {
            path: output.to_path_buf(),
            source,
        },
        other => RenderError::Encode(other),
    })?;

    println!("Saved visualization to {}", output.display());
    Ok(())
}

fn draw_figure(
    table: &PreparedTable,
    model: &ChartModel,
    buffer: &mut [u8],
) -> Result<(), RenderError> {
    let root =
        BitMapBackend::with_buffer(buffer, (FIGURE_WIDTH, FIGURE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let (plot_area, legend_area) = root.split_horizontally(FIGURE_WIDTH - LEGEND_PANEL_WIDTH);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(CHART_TITLE, ("sans-serif", TITLE_FONT_PX))
        .margin(30)
        .x_label_area_size(90)
        .y_label_area_size(110)
        .build_cartesian_2d(model.bounds.x.clone(), model.bounds.y.clone())
        .map_err(draw_err)?;

    // Whitegrid styling: light major grid, no axis spines, labels kept.
    chart
        .configure_mesh()
        .bold_line_style(GRID_COLOR)
        .light_line_style(TRANSPARENT)
        .axis_style(TRANSPARENT)
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .axis_desc_style(("sans-serif", AXIS_FONT_PX))
        .label_style(("sans-serif", TICK_FONT_PX))
        .draw()
        .map_err(draw_err)?;

    if let Some(band) = &model.band {
        let mut outline: Vec<(f64, f64)> = band.iter().map(|b| (b.x, b.upper)).collect();
        outline.extend(band.iter().rev().map(|b| (b.x, b.lower)));
        chart
            .draw_series(std::iter::once(Polygon::new(
                outline,
                REGRESSION_COLOR.mix(0.15),
            )))
            .map_err(draw_err)?;
    }

    if let (Some(fit), Some((x0, x1))) = (&model.fit, model.x_extent) {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x0, fit.predict(x0)), (x1, fit.predict(x1))],
                REGRESSION_COLOR.stroke_width(3),
            )))
            .map_err(draw_err)?;
    }

    chart
        .draw_series(
            model
                .estimator
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, REGRESSION_COLOR.filled())),
        )
        .map_err(draw_err)?;

    chart
        .draw_series(table.rows.iter().map(|row| {
            let color = model.groups.color_of(&row.income_group);
            let radius = model.sizes.radius_px(row.country_gdp).round() as i32;
            Circle::new((row.log_income, row.phl), radius, color.mix(0.85).filled())
        }))
        .map_err(draw_err)?;

    let label_style = TextStyle::from(("sans-serif", LABEL_FONT_PX).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&BLACK);
    chart
        .draw_series(table.rows.iter().map(|row| {
            Text::new(
                row.country_name.clone(),
                (row.log_income + LABEL_DX, row.phl + LABEL_DY),
                label_style.clone(),
            )
        }))
        .map_err(draw_err)?;

    draw_legend(&legend_area, model)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Draw the legend panel: income-group color swatches followed by a GDP
/// size key, vertically centered in the panel.
fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    model: &ChartModel,
) -> Result<(), RenderError> {
    let (_, height) = area.dim_in_pixel();

    let heading = TextStyle::from(("sans-serif", LEGEND_HEAD_FONT_PX).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&BLACK);
    let entry = TextStyle::from(("sans-serif", LEGEND_FONT_PX).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center))
        .color(&BLACK);

    let groups = model.groups.groups();
    let samples = size_key_samples(&model.sizes);

    let mut total = LEGEND_ROW_H;
    if !groups.is_empty() {
        total += LEGEND_ROW_H * (groups.len() as i32 + 2);
        total += samples.len() as i32 * LEGEND_SAMPLE_ROW_H;
    }
    let mut y = ((height as i32 - total) / 2).max(0);

    area.draw(&Text::new(
        "Legend",
        (LEGEND_MARGIN, y + LEGEND_ROW_H / 2),
        heading.clone(),
    ))
    .map_err(draw_err)?;
    y += LEGEND_ROW_H;

    if groups.is_empty() {
        return Ok(());
    }

    area.draw(&Text::new(
        "income_group",
        (LEGEND_MARGIN, y + LEGEND_ROW_H / 2),
        heading.clone(),
    ))
    .map_err(draw_err)?;
    y += LEGEND_ROW_H;

    for (i, group) in groups.iter().enumerate() {
        let cy = y + LEGEND_ROW_H / 2;
        area.draw(&Circle::new(
            (LEGEND_MARGIN + SWATCH_R, cy),
            SWATCH_R,
            model.groups.color_at(i).filled(),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            group.clone(),
            (LEGEND_MARGIN + SWATCH_R * 2 + 14, cy),
            entry.clone(),
        ))
        .map_err(draw_err)?;
        y += LEGEND_ROW_H;
    }

    area.draw(&Text::new(
        "country_gdp",
        (LEGEND_MARGIN, y + LEGEND_ROW_H / 2),
        heading,
    ))
    .map_err(draw_err)?;
    y += LEGEND_ROW_H;

    for gdp in samples {
        let cy = y + LEGEND_SAMPLE_ROW_H / 2;
        let radius = model.sizes.radius_px(gdp).round() as i32;
        area.draw(&Circle::new(
            (LEGEND_MARGIN + MAX_SWATCH_R, cy),
            radius,
            SIZE_KEY_COLOR.mix(0.6).filled(),
        ))
        .map_err(draw_err)?;
        area.draw(&Text::new(
            format!("{gdp:.0}"),
            (LEGEND_MARGIN + MAX_SWATCH_R * 2 + 14, cy),
            entry.clone(),
        ))
        .map_err(draw_err)?;
        y += LEGEND_SAMPLE_ROW_H;
    }

    Ok(())
}

/// Sample GDP values shown in the legend size key.
fn size_key_samples(scale: &SizeScale) -> Vec<f64> {
    if scale.hi == scale.lo {
        vec![scale.lo]
    } else {
        vec![scale.lo, (scale.lo + scale.hi) / 2.0, scale.hi]
    }
}

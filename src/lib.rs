//! Post-harvest loss chart generator.
//!
//! Loads the per-country grain loss dataset, derives the natural logarithm
//! of income, and renders one annotated scatter/regression chart to a PNG.

pub mod charts;
pub mod data;
pub mod stats;

use std::path::Path;

use anyhow::Context;
use log::info;

/// Bundled input dataset.
pub const INPUT_PATH: &str = "data/graph_post_harvest_loss.csv";
/// Where the rendered chart is written.
pub const OUTPUT_PATH: &str = "phl_scatter.png";

/// Run the full pipeline: load, derive log income, render.
pub fn run(input: &Path, output: &Path) -> anyhow::Result<()> {
    let table =
        data::load_table(input).with_context(|| format!("failed to load {}", input.display()))?;
    info!(
        "loaded {} observations from {}",
        table.len(),
        input.display()
    );

    let prepared = data::prepare(&table).context("failed to derive log_income")?;

    charts::render(&prepared, output)
        .with_context(|| format!("failed to render {}", output.display()))?;
    info!("wrote chart to {}", output.display());
    Ok(())
}

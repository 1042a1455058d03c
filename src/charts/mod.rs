//! Charts module - chart model and static rendering

mod renderer;
mod series;

pub use renderer::{render, RenderError, FIGURE_HEIGHT, FIGURE_WIDTH};
pub use series::{AxisBounds, ChartModel, GroupIndex, SizeScale, PALETTE, REGRESSION_COLOR};

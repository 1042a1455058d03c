//! Chart Model Module
//! Palette, size scale, axis bounds and the assembled model the renderer draws.

use plotters::style::RGBColor;

use crate::data::{PreparedObservation, PreparedTable};
use crate::stats::{confidence_band, fit_ols, mean_aggregate, BandPoint, LinearFit};

/// Color palette for income groups (seaborn "deep" order).
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),  // Blue
    RGBColor(221, 132, 82),  // Orange
    RGBColor(85, 168, 104),  // Green
    RGBColor(196, 78, 82),   // Red
    RGBColor(129, 114, 179), // Purple
    RGBColor(147, 120, 96),  // Brown
    RGBColor(218, 139, 195), // Pink
    RGBColor(140, 140, 140), // Grey
    RGBColor(204, 185, 116), // Olive
    RGBColor(100, 181, 205), // Cyan
];

/// Line, estimator-marker and band color of the regression layer.
pub const REGRESSION_COLOR: RGBColor = RGBColor(76, 114, 176);

/// Marker area range in typographic points squared, matching a 40-600
/// continuous size scale.
pub const SIZE_RANGE: (f64, f64) = (40.0, 600.0);

/// Typographic points to pixels at 100 dpi.
pub const PT_TO_PX: f64 = 100.0 / 72.0;

const CONFIDENCE: f64 = 0.95;
const BAND_STEPS: usize = 100;
const BOUNDS_PADDING: f64 = 0.05;

/// Income groups in order of first appearance, each keyed to a palette color.
#[derive(Debug, Clone, Default)]
pub struct GroupIndex {
    groups: Vec<String>,
}

impl GroupIndex {
    pub fn from_rows(rows: &[PreparedObservation]) -> Self {
        let mut groups: Vec<String> = Vec::new();
        for row in rows {
            if !groups.contains(&row.income_group) {
                groups.push(row.income_group.clone());
            }
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn color_at(&self, index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    pub fn color_of(&self, group: &str) -> RGBColor {
        let index = self
            .groups
            .iter()
            .position(|g| g == group)
            .unwrap_or_default();
        self.color_at(index)
    }
}

/// Linear mapping from GDP per capita onto the marker area range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScale {
    pub lo: f64,
    pub hi: f64,
}

impl SizeScale {
    pub fn from_values(values: &[f64]) -> Self {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            Self { lo, hi }
        } else {
            Self { lo: 0.0, hi: 0.0 }
        }
    }

    /// Marker area in points squared. A degenerate scale (all values equal)
    /// maps everything to the middle of the range.
    pub fn area(&self, value: f64) -> f64 {
        if self.hi == self.lo {
            return (SIZE_RANGE.0 + SIZE_RANGE.1) / 2.0;
        }
        let t = ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        SIZE_RANGE.0 + t * (SIZE_RANGE.1 - SIZE_RANGE.0)
    }

    /// Marker radius in pixels at 100 dpi.
    pub fn radius_px(&self, value: f64) -> f64 {
        (self.area(value) / std::f64::consts::PI).sqrt() * PT_TO_PX
    }
}

/// Axis ranges: data extent padded by 5% per side, 0..1 for an empty table.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisBounds {
    pub x: std::ops::Range<f64>,
    pub y: std::ops::Range<f64>,
}

impl AxisBounds {
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        if points.is_empty() {
            return Self {
                x: 0.0..1.0,
                y: 0.0..1.0,
            };
        }
        Self {
            x: Self::padded(points.iter().map(|p| p.0)),
            y: Self::padded(points.iter().map(|p| p.1)),
        }
    }

    fn padded(values: impl Iterator<Item = f64> + Clone) -> std::ops::Range<f64> {
        let lo = values.clone().fold(f64::INFINITY, f64::min);
        let hi = values.fold(f64::NEG_INFINITY, f64::max);
        let pad = if hi > lo {
            (hi - lo) * BOUNDS_PADDING
        } else {
            0.5
        };
        (lo - pad)..(hi + pad)
    }
}

/// Everything the renderer needs besides the rows themselves.
#[derive(Debug, Clone)]
pub struct ChartModel {
    pub groups: GroupIndex,
    pub sizes: SizeScale,
    pub bounds: AxisBounds,
    pub fit: Option<LinearFit>,
    pub band: Option<Vec<BandPoint>>,
    /// Mean-aggregated estimator points, sorted by x.
    pub estimator: Vec<(f64, f64)>,
    /// Data x-extent the regression line spans, present whenever `fit` is.
    pub x_extent: Option<(f64, f64)>,
}

impl ChartModel {
    pub fn from_table(table: &PreparedTable) -> Self {
        let points: Vec<(f64, f64)> = table
            .rows
            .iter()
            .map(|row| (row.log_income, row.phl))
            .collect();
        let gdp: Vec<f64> = table.rows.iter().map(|row| row.country_gdp).collect();

        let estimator = mean_aggregate(&points);
        let fit = fit_ols(&estimator);
        let band = fit
            .as_ref()
            .and_then(|f| confidence_band(&estimator, f, CONFIDENCE, BAND_STEPS));
        let x_extent = if fit.is_some() {
            Some((estimator[0].0, estimator[estimator.len() - 1].0))
        } else {
            None
        };

        Self {
            groups: GroupIndex::from_rows(&table.rows),
            sizes: SizeScale::from_values(&gdp),
            bounds: AxisBounds::from_points(&points),
            fit,
            band,
            estimator,
            x_extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PreparedObservation;

    fn row(name: &str, group: &str, gdp: f64, log_income: f64, phl: f64) -> PreparedObservation {
        PreparedObservation {
            country_name: name.to_string(),
            income: log_income.exp(),
            income_group: group.to_string(),
            country_gdp: gdp,
            phl,
            log_income,
        }
    }

    #[test]
    fn groups_follow_first_appearance_order() {
        let rows = vec![
            row("A", "mid", 1.0, 7.0, 10.0),
            row("B", "low", 2.0, 7.5, 8.0),
            row("C", "mid", 3.0, 8.0, 6.0),
            row("D", "high", 4.0, 8.5, 4.0),
        ];
        let index = GroupIndex::from_rows(&rows);
        assert_eq!(index.groups(), ["mid", "low", "high"]);
        assert_eq!(index.color_of("mid"), PALETTE[0]);
        assert_eq!(index.color_of("high"), PALETTE[2]);
    }

    #[test]
    fn palette_cycles_past_its_length() {
        let index = GroupIndex::default();
        assert_eq!(index.color_at(PALETTE.len() + 1), PALETTE[1]);
    }

    #[test]
    fn size_scale_spans_the_area_range() {
        let scale = SizeScale::from_values(&[5.0, 10.0, 20.0]);
        assert_eq!(scale.area(5.0), 40.0);
        assert_eq!(scale.area(20.0), 600.0);
        assert_eq!(scale.area(12.5), 320.0);
    }

    #[test]
    fn equal_gdp_values_map_to_the_scale_midpoint() {
        let scale = SizeScale::from_values(&[7.0, 7.0]);
        assert_eq!(scale.area(7.0), 320.0);
    }

    #[test]
    fn radius_is_monotone_in_gdp() {
        let scale = SizeScale::from_values(&[1.0, 100.0]);
        let mut last = 0.0;
        for gdp in [1.0, 25.0, 50.0, 75.0, 100.0] {
            let r = scale.radius_px(gdp);
            assert!(r > last);
            last = r;
        }
    }

    #[test]
    fn bounds_pad_the_data_extent() {
        let bounds = AxisBounds::from_points(&[(0.0, 10.0), (10.0, 20.0)]);
        assert_eq!(bounds.x, -0.5..10.5);
        assert_eq!(bounds.y, 9.5..20.5);
    }

    #[test]
    fn empty_table_falls_back_to_unit_bounds() {
        let bounds = AxisBounds::from_points(&[]);
        assert_eq!(bounds.x, 0.0..1.0);
        assert_eq!(bounds.y, 0.0..1.0);
    }

    #[test]
    fn model_of_empty_table_has_no_regression() {
        let model = ChartModel::from_table(&PreparedTable::default());
        assert!(model.fit.is_none());
        assert!(model.band.is_none());
        assert!(model.estimator.is_empty());
        assert!(model.x_extent.is_none());
    }

    #[test]
    fn model_aggregates_before_fitting() {
        // Two rows share x=7.0; the estimator must carry their mean.
        let table = PreparedTable {
            rows: vec![
                row("A", "low", 1.0, 7.0, 10.0),
                row("B", "low", 2.0, 7.0, 6.0),
                row("C", "mid", 3.0, 8.0, 4.0),
                row("D", "high", 4.0, 9.0, 2.0),
            ],
        };
        let model = ChartModel::from_table(&table);
        assert_eq!(model.estimator[0], (7.0, 8.0));
        assert_eq!(model.estimator.len(), 3);
        assert!(model.fit.is_some());
        assert_eq!(model.x_extent, Some((7.0, 9.0)));
    }
}

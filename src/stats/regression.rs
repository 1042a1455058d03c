//! Regression Module
//! Mean-aggregated ordinary least squares fit and its confidence band.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// A fitted straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// One sample of the confidence band around the regression mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Collapse points sharing an x value into one point carrying the mean of
/// their y values. Output is sorted by x.
pub fn mean_aggregate(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut out: Vec<(f64, f64)> = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let x = sorted[i].0;
        let mut sum = 0.0;
        let mut count = 0usize;
        while i < sorted.len() && sorted[i].0 == x {
            sum += sorted[i].1;
            count += 1;
            i += 1;
        }
        out.push((x, sum / count as f64));
    }
    out
}

/// Ordinary least squares over the given points. Returns `None` when the
/// points cannot pin down a line (fewer than two, or all at one x).
pub fn fit_ols(points: &[(f64, f64)]) -> Option<LinearFit> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let x_mean = points.iter().map(|p| p.0).sum::<f64>() / n;
    let y_mean = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points
        .iter()
        .map(|p| (p.0 - x_mean) * (p.1 - y_mean))
        .sum();

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Parametric confidence band for the regression mean, sampled at `steps + 1`
/// evenly spaced x positions across the extent of `points` (which must be
/// sorted by x, as `mean_aggregate` returns them).
///
/// Needs at least 3 points for positive residual degrees of freedom;
/// otherwise returns `None`.
pub fn confidence_band(
    points: &[(f64, f64)],
    fit: &LinearFit,
    confidence: f64,
    steps: usize,
) -> Option<Vec<BandPoint>> {
    let n = points.len();
    if n < 3 || steps == 0 {
        return None;
    }
    let nf = n as f64;
    let df = nf - 2.0;

    let x_mean = points.iter().map(|p| p.0).sum::<f64>() / nf;
    let sxx: f64 = points.iter().map(|p| (p.0 - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sse: f64 = points
        .iter()
        .map(|&(x, y)| {
            let r = y - fit.predict(x);
            r * r
        })
        .sum();
    let s = (sse / df).sqrt();

    let t = StudentsT::new(0.0, 1.0, df)
        .ok()?
        .inverse_cdf(0.5 + confidence / 2.0);

    let (x0, x1) = (points[0].0, points[n - 1].0);
    let band = (0..=steps)
        .map(|i| {
            let x = x0 + (x1 - x0) * i as f64 / steps as f64;
            let half = t * s * (1.0 / nf + (x - x_mean).powi(2) / sxx).sqrt();
            let y = fit.predict(x);
            BandPoint {
                x,
                lower: y - half,
                upper: y + half,
            }
        })
        .collect();
    Some(band)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_x_values_collapse_to_their_mean() {
        let points = [(2.0, 8.0), (1.0, 3.0), (2.0, 4.0), (1.0, 5.0), (3.0, 1.0)];
        let agg = mean_aggregate(&points);
        assert_eq!(agg, vec![(1.0, 4.0), (2.0, 6.0), (3.0, 1.0)]);
    }

    #[test]
    fn aggregation_of_distinct_points_only_sorts() {
        let points = [(3.0, 1.0), (1.0, 2.0), (2.0, 3.0)];
        let agg = mean_aggregate(&points);
        assert_eq!(agg, vec![(1.0, 2.0), (2.0, 3.0), (3.0, 1.0)]);
    }

    #[test]
    fn ols_recovers_exact_line() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.5 * i as f64 - 1.0)).collect();
        let fit = fit_ols(&points).unwrap();
        assert!((fit.slope - 2.5).abs() < 1e-12);
        assert!((fit.intercept + 1.0).abs() < 1e-12);
    }

    #[test]
    fn fewer_than_two_distinct_x_values_gives_no_fit() {
        assert!(fit_ols(&[]).is_none());
        assert!(fit_ols(&[(1.0, 2.0)]).is_none());
        assert!(fit_ols(&[(1.0, 2.0), (1.0, 4.0)]).is_none());
    }

    #[test]
    fn band_needs_three_points() {
        let fit = LinearFit {
            slope: 1.0,
            intercept: 0.0,
        };
        assert!(confidence_band(&[(0.0, 0.0), (1.0, 1.0)], &fit, 0.95, 10).is_none());
    }

    #[test]
    fn band_is_positive_and_widest_at_the_extremes() {
        let points = [(0.0, 0.2), (1.0, 0.9), (2.0, 2.1), (3.0, 2.8), (4.0, 4.2)];
        let fit = fit_ols(&points).unwrap();
        let band = confidence_band(&points, &fit, 0.95, 20).unwrap();

        assert_eq!(band.len(), 21);
        for b in &band {
            assert!(b.upper > b.lower, "band collapsed at x={}", b.x);
        }
        let width = |b: &BandPoint| b.upper - b.lower;
        let mid = &band[band.len() / 2];
        assert!(width(&band[0]) > width(mid));
        assert!(width(band.last().unwrap()) > width(mid));
    }

    #[test]
    fn band_straddles_the_fitted_line() {
        let points = [(1.0, 2.0), (2.0, 2.9), (3.0, 4.2), (4.0, 5.0)];
        let fit = fit_ols(&points).unwrap();
        let band = confidence_band(&points, &fit, 0.95, 10).unwrap();
        for b in &band {
            let y = fit.predict(b.x);
            assert!(b.lower <= y && y <= b.upper);
        }
    }
}

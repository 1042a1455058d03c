//! Stats module - regression fitting

mod regression;

pub use regression::{confidence_band, fit_ols, mean_aggregate, BandPoint, LinearFit};

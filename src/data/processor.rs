//! Data Processor Module
//! Derives the log-income column used by the chart.

use thiserror::Error;

use crate::data::model::{ObservationTable, PreparedObservation, PreparedTable};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("country `{country}` has non-positive income {income}; cannot take its logarithm")]
    NumericDomain { country: String, income: f64 },
}

/// Return a new table with `log_income = ln(income)` added to every row.
///
/// The input table is not mutated. A zero or negative income aborts the
/// run with `NumericDomain`.
pub fn prepare(table: &ObservationTable) -> Result<PreparedTable, ProcessorError> {
    let rows = table
        .rows
        .iter()
        .map(|obs| {
            if obs.income <= 0.0 {
                return Err(ProcessorError::NumericDomain {
                    country: obs.country_name.clone(),
                    income: obs.income,
                });
            }
            Ok(PreparedObservation {
                country_name: obs.country_name.clone(),
                income: obs.income,
                income_group: obs.income_group.clone(),
                country_gdp: obs.country_gdp,
                phl: obs.phl,
                log_income: obs.income.ln(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PreparedTable { rows })
}

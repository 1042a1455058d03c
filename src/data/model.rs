//! Observation Table Model
//! Fixed-shape row records for the post-harvest loss dataset.

/// One data record: a country with its income, income classification,
/// per-capita GDP and average post-harvest loss percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country_name: String,
    pub income: f64,
    pub income_group: String,
    pub country_gdp: f64,
    pub phl: f64,
}

/// Output of the loader: one `Observation` per file record, file order
/// preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    pub rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An `Observation` plus the derived `log_income` column.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedObservation {
    pub country_name: String,
    pub income: f64,
    pub income_group: String,
    pub country_gdp: f64,
    pub phl: f64,
    pub log_income: f64,
}

/// Output of the preparer. A separate type from `ObservationTable` so the
/// input table cannot be mutated by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PreparedTable {
    pub rows: Vec<PreparedObservation>,
}

impl PreparedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

//! Data module - CSV loading and log-income derivation

mod loader;
mod model;
mod processor;

pub use loader::{load_table, LoaderError, REQUIRED_COLUMNS};
pub use model::{Observation, ObservationTable, PreparedObservation, PreparedTable};
pub use processor::{prepare, ProcessorError};

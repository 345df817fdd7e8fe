//! Loading of wide assessment and intervention tables from CSV.

pub mod csv_table;
pub mod error;
pub mod wide;

pub use csv_table::{CsvTable, read_csv_table};
pub use error::{IngestError, Result};
pub use wide::{read_assessment_table, read_intervention_table, wide_table_from_csv};

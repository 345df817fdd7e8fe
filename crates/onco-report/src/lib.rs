//! Output tables for derived oncology endpoints.
//!
//! - **Endpoint table**: one row per patient, raw and censored-at-new-therapy
//!   variants, with month columns for every cycle-valued time
//! - **JSON**: the same records plus options and derivation issues
//! - **Analysis datasets**: time and status per subject for one estimand

mod frame;
mod writer;

pub use frame::{analysis_frame, endpoint_column_names, endpoint_frame};
pub use writer::{
    ENDPOINTS_CSV, ENDPOINTS_JSON, EndpointDocument, OutputFormat, OutputPaths,
    write_analysis_csv, write_endpoint_csv, write_endpoint_json, write_frame_csv, write_outputs,
};

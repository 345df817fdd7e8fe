//! CSV and JSON writers.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::{debug, info, info_span};

use onco_core::{AnalysisDataset, CohortDerivation};
use onco_model::{DerivationIssue, DerivationOptions, PatientEndpoints};

use crate::frame::{analysis_frame, endpoint_frame};

/// File name of the derived-endpoint CSV.
pub const ENDPOINTS_CSV: &str = "endpoints.csv";

/// File name of the derived-endpoint JSON.
pub const ENDPOINTS_JSON: &str = "endpoints.json";

/// Output formats for derived endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

/// Paths of the files written for one run.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

/// JSON document with the derived endpoints and the run's issues.
#[derive(Debug, Serialize)]
pub struct EndpointDocument<'a> {
    pub options: &'a DerivationOptions,
    pub max_ttp: u32,
    pub max_ttp_censored_at_anp: u32,
    pub endpoints: &'a [PatientEndpoints],
    pub excluded: &'a [String],
    pub issues: &'a [DerivationIssue],
}

impl<'a> EndpointDocument<'a> {
    pub fn new(derivation: &'a CohortDerivation, options: &'a DerivationOptions) -> Self {
        Self {
            options,
            max_ttp: derivation.cohort.max_ttp,
            max_ttp_censored_at_anp: derivation.cohort.max_ttp_censored_at_anp,
            endpoints: &derivation.endpoints,
            excluded: &derivation.excluded,
            issues: &derivation.report.issues,
        }
    }
}

/// Writes a frame as CSV with a header row.
pub fn write_frame_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Writes `endpoints.csv` into `output_dir`.
pub fn write_endpoint_csv(output_dir: &Path, derivation: &CohortDerivation) -> Result<PathBuf> {
    let mut df = endpoint_frame(&derivation.endpoints, &derivation.schedule)?;
    let path = output_dir.join(ENDPOINTS_CSV);
    write_frame_csv(&path, &mut df)?;
    debug!(path = %path.display(), rows = df.height(), "endpoint csv written");
    Ok(path)
}

/// Writes `endpoints.json` into `output_dir`.
pub fn write_endpoint_json(
    output_dir: &Path,
    derivation: &CohortDerivation,
    options: &DerivationOptions,
) -> Result<PathBuf> {
    let path = output_dir.join(ENDPOINTS_JSON);
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let document = EndpointDocument::new(derivation, options);
    serde_json::to_writer_pretty(BufWriter::new(file), &document)
        .with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), "endpoint json written");
    Ok(path)
}

/// Writes the derived endpoints in each requested format.
pub fn write_outputs(
    output_dir: &Path,
    derivation: &CohortDerivation,
    options: &DerivationOptions,
    formats: &[OutputFormat],
) -> Result<OutputPaths> {
    let output_span = info_span!("output", output_dir = %output_dir.display());
    let _output_guard = output_span.enter();
    let start = Instant::now();

    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let mut paths = OutputPaths::default();
    if formats.contains(&OutputFormat::Csv) {
        paths.csv = Some(write_endpoint_csv(output_dir, derivation)?);
    }
    if formats.contains(&OutputFormat::Json) {
        paths.json = Some(write_endpoint_json(output_dir, derivation, options)?);
    }
    info!(
        patient_count = derivation.endpoints.len(),
        duration_ms = start.elapsed().as_millis(),
        "outputs written"
    );
    Ok(paths)
}

/// Writes an analysis dataset as CSV.
pub fn write_analysis_csv(path: &Path, dataset: &AnalysisDataset) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut df = analysis_frame(dataset)?;
    write_frame_csv(path, &mut df)?;
    info!(
        estimand = dataset.strategy.label(),
        records = dataset.len(),
        events = dataset.event_count(),
        path = %path.display(),
        "analysis dataset written"
    );
    Ok(())
}

use std::path::PathBuf;

use onco_core::CohortSummary;
use onco_model::DerivationIssue;
use onco_report::OutputPaths;

#[derive(Debug)]
pub struct DeriveResult {
    pub assessments: PathBuf,
    pub output_dir: PathBuf,
    pub summary: CohortSummary,
    pub outputs: OutputPaths,
    pub issues: Vec<DerivationIssue>,
    pub dry_run: bool,
    pub has_errors: bool,
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub estimand: &'static str,
    pub output: PathBuf,
    pub records: usize,
    pub events: usize,
    pub excluded: usize,
}

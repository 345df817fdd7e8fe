//! Ingest and derivation stages shared by the CLI commands.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use onco_core::{CohortDerivation, CohortInput, DerivationEngine};
use onco_ingest::{read_assessment_table, read_intervention_table};
use onco_model::{CohortMaximum, DerivationOptions};

/// Everything needed to derive one cohort from disk.
#[derive(Debug, Clone)]
pub struct DeriveRequest {
    pub assessments: PathBuf,
    pub interventions: Option<PathBuf>,
    pub id_column: Option<String>,
    pub options: DerivationOptions,
}

impl DeriveRequest {
    pub fn new(assessments: impl Into<PathBuf>) -> Self {
        Self {
            assessments: assessments.into(),
            interventions: None,
            id_column: None,
            options: DerivationOptions::default(),
        }
    }

    pub fn with_interventions(mut self, path: impl Into<PathBuf>) -> Self {
        self.interventions = Some(path.into());
        self
    }

    pub fn with_options(mut self, options: DerivationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Builds derivation options from CLI flags.
///
/// `--strict` selects the strict policies; the cycle length and a fixed
/// cohort maximum apply on top of either mode.
pub fn derivation_options(
    strict: bool,
    cycle_length_days: u32,
    fixed_cohort_max: Option<u32>,
) -> DerivationOptions {
    let base = if strict {
        DerivationOptions::strict()
    } else {
        DerivationOptions::default()
    };
    let cohort_maximum = match fixed_cohort_max {
        Some(cycle) => CohortMaximum::Fixed(cycle),
        None => CohortMaximum::Derived,
    };
    base.with_cycle_length(cycle_length_days)
        .with_cohort_maximum(cohort_maximum)
}

/// Reads the assessment and optional intervention tables.
pub fn ingest(request: &DeriveRequest) -> Result<CohortInput> {
    let ingest_span = info_span!(
        "ingest",
        assessments = %request.assessments.display()
    );
    let _ingest_guard = ingest_span.enter();
    let start = Instant::now();

    let id_column = request.id_column.as_deref();
    let assessments = read_assessment_table(&request.assessments, id_column)
        .with_context(|| format!("read assessments {}", request.assessments.display()))?;
    let mut input = CohortInput::new(assessments);
    if let Some(path) = &request.interventions {
        let interventions = read_intervention_table(path, id_column)
            .with_context(|| format!("read interventions {}", path.display()))?;
        input = input.with_interventions(interventions);
    }
    info!(
        patient_count = input.assessments.len(),
        visit_count = input.assessments.visit_labels.len(),
        interventions = input.interventions.is_some(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(input)
}

/// Ingests the tables and runs the derivation engine.
pub fn derive(request: &DeriveRequest) -> Result<CohortDerivation> {
    let input = ingest(request)?;
    DerivationEngine::new(request.options.clone())
        .derive(&input)
        .with_context(|| format!("derive endpoints for {}", request.assessments.display()))
}

/// Default output directory next to the assessment table.
pub fn default_output_dir(assessments: &Path) -> PathBuf {
    assessments
        .parent()
        .map_or_else(|| PathBuf::from("output"), |parent| parent.join("output"))
}

//! Cohort derivation pipeline.
//!
//! Turns the assessment table (and optional intervention table) into one
//! [`PatientEndpoints`] record per valid patient, applying the configured
//! policies for invalid patients and late assessments.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use onco_model::{
    Assessment, AssessmentSequence, DerivationIssue, DerivationOptions, DerivationReport,
    InterventionMark, InterventionRecord, InvalidPatientPolicy, IssueCode, PatientEndpoints,
    PostInterventionPolicy, WideRow, WideTable, parse_intervention_cell, parse_response_cell,
};

use crate::derive::{CohortReference, PatientDerivation, derive_patient};
use crate::error::{DerivationError, Result};
use crate::intercurrent::{CensorAtNewTherapy, IgnoreIntercurrentEvents, IntercurrentStrategy};
use crate::schedule::VisitSchedule;

/// In-memory input tables for one derivation run.
#[derive(Debug, Clone, Default)]
pub struct CohortInput {
    pub assessments: WideTable,
    pub interventions: Option<WideTable>,
}

impl CohortInput {
    pub fn new(assessments: WideTable) -> Self {
        Self {
            assessments,
            interventions: None,
        }
    }

    pub fn with_interventions(mut self, interventions: WideTable) -> Self {
        self.interventions = Some(interventions);
        self
    }
}

/// Output of one derivation run.
#[derive(Debug, Clone)]
pub struct CohortDerivation {
    /// Derived patients, in assessment-table order.
    pub endpoints: Vec<PatientEndpoints>,
    pub schedule: VisitSchedule,
    pub cohort: CohortReference,
    pub report: DerivationReport,
    /// Subjects left out under [`InvalidPatientPolicy::Exclude`].
    pub excluded: Vec<String>,
}

/// Derivation engine, parameterized by the intercurrent-event strategy.
#[derive(Clone)]
pub struct DerivationEngine {
    options: DerivationOptions,
    strategy: Option<Arc<dyn IntercurrentStrategy>>,
}

impl DerivationEngine {
    pub fn new(options: DerivationOptions) -> Self {
        Self {
            options,
            strategy: None,
        }
    }

    /// Overrides the strategy chosen from the input.
    ///
    /// By default new therapies are censored when an intervention table is
    /// supplied and ignored otherwise.
    pub fn with_strategy(mut self, strategy: Arc<dyn IntercurrentStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn options(&self) -> &DerivationOptions {
        &self.options
    }

    fn strategy_for(&self, input: &CohortInput) -> Arc<dyn IntercurrentStrategy> {
        match (&self.strategy, &input.interventions) {
            (Some(strategy), _) => Arc::clone(strategy),
            (None, Some(_)) => Arc::new(CensorAtNewTherapy),
            (None, None) => Arc::new(IgnoreIntercurrentEvents),
        }
    }

    /// Runs both derivation phases over the cohort.
    pub fn derive(&self, input: &CohortInput) -> Result<CohortDerivation> {
        let strategy = self.strategy_for(input);
        let derive_span = info_span!(
            "derive",
            patient_count = input.assessments.len(),
            strategy = strategy.name()
        );
        let _derive_guard = derive_span.enter();
        let start = Instant::now();

        let schedule = VisitSchedule::from_labels(&input.assessments.visit_labels, &self.options)?;
        let records = match &input.interventions {
            Some(table) => intervention_records(table, &self.options)?,
            None => BTreeMap::new(),
        };

        let mut report = DerivationReport::default();
        let mut excluded = Vec::new();
        let mut derivations = Vec::with_capacity(input.assessments.len());

        let counts = subject_counts(&input.assessments);
        let mut seen = BTreeSet::new();
        for row in &input.assessments.rows {
            if !seen.insert(row.subject_id.as_str()) {
                continue;
            }
            let outcome = if counts.get(row.subject_id.as_str()).copied().unwrap_or(0) > 1 {
                Err(DerivationError::DuplicateSubject {
                    subject_id: row.subject_id.clone(),
                    table: "assessment",
                })
            } else {
                self.derive_row(row, &schedule, &records, strategy.as_ref(), &mut report)
            };
            match outcome {
                Ok(derivation) => derivations.push(derivation),
                Err(error) => {
                    self.handle_invalid(error, &mut report)?;
                    excluded.push(row.subject_id.clone());
                }
            }
        }

        for subject_id in records.keys() {
            if !seen.contains(subject_id.as_str()) {
                warn!(
                    code = IssueCode::UnmatchedIntervention.as_code(),
                    "intervention row without assessments"
                );
                report.push(DerivationIssue::warning(
                    IssueCode::UnmatchedIntervention,
                    subject_id.clone(),
                    "intervention row has no matching assessment row",
                ));
            }
        }

        debug!(
            derived = derivations.len(),
            excluded = excluded.len(),
            duration_ms = start.elapsed().as_millis(),
            "per-patient pass complete"
        );

        let (cohort, endpoints) = info_span!("cohort").in_scope(|| -> Result<_> {
            let start = Instant::now();
            let cohort =
                CohortReference::from_derivations(&derivations, self.options.cohort_maximum)?;
            let endpoints: Vec<PatientEndpoints> = derivations
                .into_iter()
                .map(|derivation| derivation.into_endpoints(&cohort))
                .collect();
            debug!(
                max_ttp = cohort.max_ttp,
                max_ttp_censored_at_anp = cohort.max_ttp_censored_at_anp,
                duration_ms = start.elapsed().as_millis(),
                "cohort pass complete"
            );
            Ok((cohort, endpoints))
        })?;

        info!(
            patient_count = endpoints.len(),
            excluded = excluded.len(),
            warnings = report.warning_count(),
            duration_ms = start.elapsed().as_millis(),
            "derivation complete"
        );

        Ok(CohortDerivation {
            endpoints,
            schedule,
            cohort,
            report,
            excluded,
        })
    }

    fn derive_row(
        &self,
        row: &WideRow,
        schedule: &VisitSchedule,
        records: &BTreeMap<String, Result<InterventionRecord>>,
        strategy: &dyn IntercurrentStrategy,
        report: &mut DerivationReport,
    ) -> Result<PatientDerivation> {
        let sequence = assessment_sequence(row, schedule)?;
        let record = match records.get(&row.subject_id) {
            Some(Ok(record)) => Some(record),
            Some(Err(error)) => return Err(error.clone()),
            None => None,
        };
        let resolution = strategy.resolve(&sequence, record);

        if let Some(anp_cycle) = resolution.anp_cycle
            && !resolution.post_event_cycles.is_empty()
        {
            let error = DerivationError::PostInterventionAssessment {
                subject_id: row.subject_id.clone(),
                anp_cycle,
                cycles: resolution.post_event_cycles.clone(),
            };
            match self.options.post_intervention {
                PostInterventionPolicy::Reject => return Err(error),
                PostInterventionPolicy::Warn => {
                    warn!(
                        code = IssueCode::PostInterventionAssessment.as_code(),
                        anp_cycle,
                        late_assessments = resolution.post_event_cycles.len(),
                        "assessments at or after new therapy dropped from censored variant"
                    );
                    report.push(DerivationIssue::warning(
                        IssueCode::PostInterventionAssessment,
                        row.subject_id.clone(),
                        error.to_string(),
                    ));
                }
            }
        }

        derive_patient(&sequence, &resolution)
    }

    fn handle_invalid(&self, error: DerivationError, report: &mut DerivationReport) -> Result<()> {
        let (Some(code), Some(subject_id)) = (error.issue_code(), error.subject_id()) else {
            return Err(error);
        };
        match self.options.invalid_patient {
            InvalidPatientPolicy::Abort => Err(error),
            InvalidPatientPolicy::Exclude => {
                warn!(code = code.as_code(), "patient excluded");
                debug!(subject_id, error = %error, "excluded patient detail");
                report.push(DerivationIssue::error(code, subject_id, error.to_string()));
                Ok(())
            }
        }
    }
}

impl Default for DerivationEngine {
    fn default() -> Self {
        Self::new(DerivationOptions::default())
    }
}

/// Rejects rows whose cells do not line up with the visit columns.
fn check_row_width(row: &WideRow, schedule: &VisitSchedule, table: &'static str) -> Result<()> {
    let expected = schedule.visits().len();
    if row.cells.len() == expected {
        return Ok(());
    }
    Err(DerivationError::RowWidthMismatch {
        subject_id: row.subject_id.clone(),
        table,
        expected,
        found: row.cells.len(),
    })
}

/// Interprets one assessment row against the schedule.
pub fn assessment_sequence(row: &WideRow, schedule: &VisitSchedule) -> Result<AssessmentSequence> {
    check_row_width(row, schedule, "assessment")?;
    let mut assessments = Vec::with_capacity(schedule.visits().len());
    for (visit, cell) in schedule.visits().iter().zip(&row.cells) {
        let response =
            parse_response_cell(cell).map_err(|_| DerivationError::UnknownResponse {
                subject_id: row.subject_id.clone(),
                label: visit.label.clone(),
                value: cell.trim().to_string(),
            })?;
        assessments.push(Assessment::new(visit.cycle, response));
    }
    Ok(AssessmentSequence::new(row.subject_id.clone(), assessments))
}

/// Interprets one intervention row against its schedule.
pub fn intervention_record(row: &WideRow, schedule: &VisitSchedule) -> Result<InterventionRecord> {
    check_row_width(row, schedule, "intervention")?;
    let mut marks = Vec::with_capacity(schedule.visits().len());
    for (visit, cell) in schedule.visits().iter().zip(&row.cells) {
        let started = parse_intervention_cell(cell).map_err(|_| DerivationError::UnknownMarker {
            subject_id: row.subject_id.clone(),
            label: visit.label.clone(),
            value: cell.trim().to_string(),
        })?;
        marks.push(InterventionMark {
            cycle: visit.cycle,
            started,
        });
    }
    Ok(InterventionRecord::new(row.subject_id.clone(), marks))
}

/// Intervention records keyed by subject.
///
/// Per-row problems are kept as errors so they surface on the matching
/// patient instead of failing the run.
fn intervention_records(
    table: &WideTable,
    options: &DerivationOptions,
) -> Result<BTreeMap<String, Result<InterventionRecord>>> {
    let schedule = VisitSchedule::from_labels(&table.visit_labels, options)?;
    let mut records = BTreeMap::new();
    for row in &table.rows {
        let record = match records.get(&row.subject_id) {
            Some(_) => Err(DerivationError::DuplicateSubject {
                subject_id: row.subject_id.clone(),
                table: "intervention",
            }),
            None => intervention_record(row, &schedule),
        };
        records.insert(row.subject_id.clone(), record);
    }
    Ok(records)
}

fn subject_counts(table: &WideTable) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for row in &table.rows {
        *counts.entry(row.subject_id.as_str()).or_insert(0) += 1;
    }
    counts
}

//! Error types for endpoint derivation.

use thiserror::Error;

use onco_model::IssueCode;

/// Errors raised by the derivation engine.
///
/// Schedule and estimand errors are always fatal. Patient-level errors carry
/// the subject identifier and are handled according to the configured
/// invalid-patient policy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    // === Schedule Errors ===
    /// A visit column label does not encode a cycle number.
    #[error("malformed visit label '{label}': {reason}")]
    MalformedVisitLabel { label: String, reason: &'static str },

    /// Two visit columns map to the same cycle.
    #[error("visit labels '{first}' and '{second}' both map to cycle {cycle}")]
    DuplicateCycle {
        cycle: u32,
        first: String,
        second: String,
    },

    /// The table has no visit columns.
    #[error("visit schedule has no visits")]
    EmptySchedule,

    // === Patient Errors ===
    /// No non-missing assessment for the patient.
    #[error("subject {subject_id} has no recorded assessment")]
    NoAssessments { subject_id: String },

    /// Every assessment falls at or after the new-therapy cycle.
    #[error("subject {subject_id} has no recorded assessment before new therapy at cycle {anp_cycle}")]
    NoAssessmentsBeforeNewTherapy { subject_id: String, anp_cycle: u32 },

    /// Assessments recorded at or after the new-therapy cycle.
    #[error("subject {subject_id} has assessments at cycles {cycles:?} at or after new therapy at cycle {anp_cycle}")]
    PostInterventionAssessment {
        subject_id: String,
        anp_cycle: u32,
        cycles: Vec<u32>,
    },

    /// Unrecognised response category.
    #[error("subject {subject_id}: unknown response '{value}' at visit {label}")]
    UnknownResponse {
        subject_id: String,
        label: String,
        value: String,
    },

    /// Unrecognised intervention marker.
    #[error("subject {subject_id}: unknown intervention marker '{value}' at visit {label}")]
    UnknownMarker {
        subject_id: String,
        label: String,
        value: String,
    },

    /// Subject listed more than once in the same table.
    #[error("subject {subject_id} appears more than once in the {table} table")]
    DuplicateSubject {
        subject_id: String,
        table: &'static str,
    },

    /// Row cell count differs from the number of visit columns.
    #[error("subject {subject_id}: {table} row has {found} cells for {expected} visit columns")]
    RowWidthMismatch {
        subject_id: String,
        table: &'static str,
        expected: usize,
        found: usize,
    },

    // === Cohort Errors ===
    /// No patient could be derived.
    #[error("no patient could be derived")]
    EmptyCohort,

    /// A fixed cohort maximum below an observed TTP.
    #[error("fixed cohort maximum {fixed} is below observed time to progression {observed}")]
    InvalidCohortMaximum { fixed: u32, observed: u32 },

    // === Estimand Errors ===
    /// Estimand label not in the supported set.
    #[error("unsupported estimand '{label}'")]
    UnsupportedEstimand { label: String },
}

impl DerivationError {
    /// Subject identifier for patient-level errors.
    pub fn subject_id(&self) -> Option<&str> {
        match self {
            DerivationError::NoAssessments { subject_id }
            | DerivationError::NoAssessmentsBeforeNewTherapy { subject_id, .. }
            | DerivationError::PostInterventionAssessment { subject_id, .. }
            | DerivationError::UnknownResponse { subject_id, .. }
            | DerivationError::UnknownMarker { subject_id, .. }
            | DerivationError::DuplicateSubject { subject_id, .. }
            | DerivationError::RowWidthMismatch { subject_id, .. } => Some(subject_id),
            _ => None,
        }
    }

    /// Issue code for patient-level errors.
    pub fn issue_code(&self) -> Option<IssueCode> {
        match self {
            DerivationError::NoAssessments { .. } => Some(IssueCode::NoAssessments),
            DerivationError::NoAssessmentsBeforeNewTherapy { .. } => {
                Some(IssueCode::NoAssessmentsBeforeNewTherapy)
            }
            DerivationError::PostInterventionAssessment { .. } => {
                Some(IssueCode::PostInterventionAssessment)
            }
            DerivationError::UnknownResponse { .. } => Some(IssueCode::UnknownResponse),
            DerivationError::UnknownMarker { .. } => Some(IssueCode::UnknownMarker),
            DerivationError::DuplicateSubject { .. } => Some(IssueCode::DuplicateSubject),
            DerivationError::RowWidthMismatch { .. } => Some(IssueCode::RowWidthMismatch),
            _ => None,
        }
    }

    /// Returns true if the error concerns a single patient.
    pub fn is_patient_level(&self) -> bool {
        self.subject_id().is_some()
    }
}

/// Result type for derivation operations.
pub type Result<T> = std::result::Result<T, DerivationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_errors_expose_subject() {
        let err = DerivationError::NoAssessments {
            subject_id: "P07".to_string(),
        };
        assert_eq!(err.subject_id(), Some("P07"));
        assert_eq!(err.issue_code(), Some(IssueCode::NoAssessments));
        assert_eq!(err.to_string(), "subject P07 has no recorded assessment");
    }

    #[test]
    fn row_width_error_is_patient_level() {
        let err = DerivationError::RowWidthMismatch {
            subject_id: "P03".to_string(),
            table: "assessment",
            expected: 4,
            found: 5,
        };
        assert_eq!(err.subject_id(), Some("P03"));
        assert_eq!(err.issue_code(), Some(IssueCode::RowWidthMismatch));
        assert_eq!(
            err.to_string(),
            "subject P03: assessment row has 5 cells for 4 visit columns"
        );
    }

    #[test]
    fn estimand_error_names_label() {
        let err = DerivationError::UnsupportedEstimand {
            label: "dor-while-alive".to_string(),
        };
        assert!(!err.is_patient_level());
        assert_eq!(err.to_string(), "unsupported estimand 'dor-while-alive'");
    }
}

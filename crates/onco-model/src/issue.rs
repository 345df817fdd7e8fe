use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// The patient was excluded from the derived table.
    Error,
    /// The patient was derived, but its input broke a documented precondition.
    Warning,
}

/// Stable identifiers for derivation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueCode {
    /// No recorded assessment at all.
    NoAssessments,
    /// No recorded assessment before the new-therapy cycle.
    NoAssessmentsBeforeNewTherapy,
    /// Assessments recorded at or after the new-therapy cycle.
    PostInterventionAssessment,
    /// Unrecognised response category in the assessment table.
    UnknownResponse,
    /// Unrecognised marker in the intervention table.
    UnknownMarker,
    /// The same subject appears more than once in a table.
    DuplicateSubject,
    /// Intervention row without a matching assessment row.
    UnmatchedIntervention,
    /// Row cell count differs from the number of visit columns.
    RowWidthMismatch,
}

impl IssueCode {
    pub fn as_code(&self) -> &'static str {
        match self {
            IssueCode::NoAssessments => "EP001",
            IssueCode::NoAssessmentsBeforeNewTherapy => "EP002",
            IssueCode::PostInterventionAssessment => "EP003",
            IssueCode::UnknownResponse => "EP004",
            IssueCode::UnknownMarker => "EP005",
            IssueCode::DuplicateSubject => "EP006",
            IssueCode::UnmatchedIntervention => "EP007",
            IssueCode::RowWidthMismatch => "EP008",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

/// A problem found with one patient's input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationIssue {
    pub code: IssueCode,
    pub subject_id: String,
    pub message: String,
    pub severity: IssueSeverity,
}

impl DerivationIssue {
    pub fn error(code: IssueCode, subject_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            subject_id: subject_id.into(),
            message: message.into(),
            severity: IssueSeverity::Error,
        }
    }

    pub fn warning(
        code: IssueCode,
        subject_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            subject_id: subject_id.into(),
            message: message.into(),
            severity: IssueSeverity::Warning,
        }
    }
}

/// Issues collected over one cohort derivation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DerivationReport {
    pub issues: Vec<DerivationIssue>,
}

impl DerivationReport {
    pub fn push(&mut self, issue: DerivationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

pub mod assessment;
pub mod endpoints;
pub mod error;
pub mod issue;
pub mod options;
pub mod response;
pub mod table;

pub use assessment::{Assessment, AssessmentSequence, InterventionMark, InterventionRecord};
pub use endpoints::{
    CompetingEndpoint, CompetingStatus, EventStatus, PatientEndpoints, TtrStatus, Variant,
    VariantEndpoints,
};
pub use error::{ModelError, Result};
pub use issue::{DerivationIssue, DerivationReport, IssueCode, IssueSeverity};
pub use options::{
    CohortMaximum, DAYS_PER_MONTH, DEFAULT_CYCLE_LENGTH_DAYS, DerivationOptions,
    InvalidPatientPolicy, PostInterventionPolicy,
};
pub use response::{Response, parse_intervention_cell, parse_response_cell};
pub use table::{WideRow, WideTable};

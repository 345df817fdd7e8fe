pub mod analysis;
pub mod best_response;
pub mod derive;
pub mod error;
pub mod estimand;
pub mod intercurrent;
pub mod pipeline;
pub mod rules;
pub mod schedule;
pub mod summary;

pub use analysis::{AnalysisDataset, AnalysisRecord};
pub use best_response::{BestResponse, classify};
pub use derive::{
    CohortReference, PatientDerivation, derive_patient, derive_variant, substituted_ttr,
};
pub use error::{DerivationError, Result};
pub use estimand::{Estimand, EstimandStrategy, EventField, Population, TimeField, select};
pub use intercurrent::{
    CensorAtNewTherapy, IgnoreIntercurrentEvents, IntercurrentStrategy, Resolution,
};
pub use pipeline::{
    CohortDerivation, CohortInput, DerivationEngine, assessment_sequence, intervention_record,
};
pub use rules::{
    ResponseFlags, RuleOutcome, StatusRule, StatusRuleTable, TIR_STATUS_RULES, TTP_STATUS_RULES,
    TTR_STATUS_RULES,
};
pub use schedule::{Visit, VisitSchedule, parse_cycle_label};
pub use summary::{BorCounts, CohortSummary};

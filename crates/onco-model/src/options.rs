//! Configuration options for endpoint derivation.

use serde::{Deserialize, Serialize};

/// Cycle length used by the visit schedule, in days.
pub const DEFAULT_CYCLE_LENGTH_DAYS: u32 = 28;

/// Average days per month (365.25 / 12).
pub const DAYS_PER_MONTH: f64 = 365.25 / 12.0;

/// What to do with a patient whose input cannot be derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InvalidPatientPolicy {
    /// Report the patient as an error issue and leave it out of the table.
    #[default]
    Exclude,
    /// Fail the whole derivation on the first invalid patient.
    Abort,
}

/// What to do when assessments were recorded after the new-therapy cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostInterventionPolicy {
    /// Keep the patient, drop the late assessments from the censored variant,
    /// and record a warning.
    #[default]
    Warn,
    /// Treat the patient as invalid (see [`InvalidPatientPolicy`]).
    Reject,
}

/// Population that defines the maximum TTP used for substituted TTR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CohortMaximum {
    /// Maximum over every patient derived in this run.
    #[default]
    Derived,
    /// Externally supplied maximum, e.g. from the full cohort when re-running
    /// on a subset. Must not be below any derived TTP.
    Fixed(u32),
}

/// Options controlling endpoint derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivationOptions {
    /// Length of one treatment cycle in days.
    pub cycle_length_days: u32,

    /// Days per month used for month conversions.
    pub days_per_month: f64,

    /// Handling of patients that fail derivation.
    pub invalid_patient: InvalidPatientPolicy,

    /// Handling of assessments recorded after a new therapy started.
    pub post_intervention: PostInterventionPolicy,

    /// Population defining the substituted-TTR maximum.
    pub cohort_maximum: CohortMaximum,
}

impl Default for DerivationOptions {
    fn default() -> Self {
        Self {
            cycle_length_days: DEFAULT_CYCLE_LENGTH_DAYS,
            days_per_month: DAYS_PER_MONTH,
            invalid_patient: InvalidPatientPolicy::Exclude,
            post_intervention: PostInterventionPolicy::Warn,
            cohort_maximum: CohortMaximum::Derived,
        }
    }
}

impl DerivationOptions {
    /// Options that reject any precondition violation.
    ///
    /// The first invalid patient aborts the derivation and late assessments
    /// after a new therapy count as invalid input.
    pub fn strict() -> Self {
        Self {
            invalid_patient: InvalidPatientPolicy::Abort,
            post_intervention: PostInterventionPolicy::Reject,
            ..Self::default()
        }
    }

    pub fn with_cycle_length(mut self, days: u32) -> Self {
        self.cycle_length_days = days;
        self
    }

    pub fn with_cohort_maximum(mut self, cohort_maximum: CohortMaximum) -> Self {
        self.cohort_maximum = cohort_maximum;
        self
    }
}

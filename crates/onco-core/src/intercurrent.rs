//! Intercurrent-event handling.
//!
//! A new anti-cancer therapy (ANP) is the intercurrent event. Each strategy
//! turns a patient's raw assessments and optional intervention record into a
//! [`Resolution`]: whether and when a new therapy started, and the censored
//! copy of the assessments that the hypothetical variant is derived from.

use tracing::trace;

use onco_model::{AssessmentSequence, InterventionRecord};

/// Outcome of resolving one patient's intercurrent events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub any_anp: bool,
    /// First cycle flagged as a new-therapy start.
    pub anp_cycle: Option<u32>,
    /// Assessments with every visit at or after `anp_cycle` set to missing.
    pub censored: AssessmentSequence,
    /// Cycles with a recorded assessment at or after `anp_cycle`.
    ///
    /// Well-formed input has none; these are dropped from the censored copy
    /// and reported as precondition violations.
    pub post_event_cycles: Vec<u32>,
}

impl Resolution {
    /// Resolution for a patient without intercurrent events.
    pub fn unaffected(sequence: &AssessmentSequence) -> Self {
        Self {
            any_anp: false,
            anp_cycle: None,
            censored: sequence.clone(),
            post_event_cycles: Vec::new(),
        }
    }
}

/// Strategy for handling a new therapy during follow-up.
pub trait IntercurrentStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Resolve one patient. `record` is `None` when the patient has no
    /// intervention row.
    fn resolve(
        &self,
        sequence: &AssessmentSequence,
        record: Option<&InterventionRecord>,
    ) -> Resolution;
}

/// Used when no intervention table is supplied: nothing is censored.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreIntercurrentEvents;

impl IntercurrentStrategy for IgnoreIntercurrentEvents {
    fn name(&self) -> &'static str {
        "ignore"
    }

    fn resolve(
        &self,
        sequence: &AssessmentSequence,
        _record: Option<&InterventionRecord>,
    ) -> Resolution {
        Resolution::unaffected(sequence)
    }
}

/// Hypothetical strategy: discard every assessment from the new-therapy
/// cycle onwards instead of imputing what would have been observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CensorAtNewTherapy;

impl IntercurrentStrategy for CensorAtNewTherapy {
    fn name(&self) -> &'static str {
        "censor-at-new-therapy"
    }

    fn resolve(
        &self,
        sequence: &AssessmentSequence,
        record: Option<&InterventionRecord>,
    ) -> Resolution {
        let Some(anp_cycle) = record.and_then(InterventionRecord::first_start_cycle) else {
            return Resolution::unaffected(sequence);
        };
        let censored = sequence.censored_from(anp_cycle);
        let post_event_cycles = sequence.observed_from(anp_cycle);
        trace!(
            subject_id = sequence.subject_id(),
            anp_cycle,
            "censored assessments at new therapy"
        );
        Resolution {
            any_anp: true,
            anp_cycle: Some(anp_cycle),
            censored,
            post_event_cycles,
        }
    }
}

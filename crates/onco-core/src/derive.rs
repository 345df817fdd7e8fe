//! Per-patient endpoint derivation and the cohort pass.
//!
//! Derivation runs in two phases. [`derive_patient`] computes everything that
//! depends on one patient only, leaving substituted TTR provisional. Once all
//! patients are derived, [`CohortReference::from_derivations`] reduces the
//! cohort to its maximum TTP and [`PatientDerivation::into_endpoints`] fills
//! in substituted TTR.

use tracing::trace;

use onco_model::{
    AssessmentSequence, CohortMaximum, CompetingEndpoint, CompetingStatus, PatientEndpoints,
    Response, VariantEndpoints,
};

use crate::best_response::classify;
use crate::error::{DerivationError, Result};
use crate::intercurrent::Resolution;
use crate::rules::{ResponseFlags, TIR_STATUS_RULES, TTP_STATUS_RULES, TTR_STATUS_RULES};

/// Derives the single-patient endpoints of one assessment sequence.
///
/// `sttr` is set to `ttr`; the cohort pass replaces it where substitution
/// applies. Fails when the sequence has no recorded assessment.
pub fn derive_variant(sequence: &AssessmentSequence) -> Result<VariantEndpoints> {
    let last_cycle =
        sequence
            .last_observed_cycle()
            .ok_or_else(|| DerivationError::NoAssessments {
                subject_id: sequence.subject_id().to_string(),
            })?;
    let best = classify(sequence);
    let any_pd = sequence.contains(Response::Progressive);
    let flags = ResponseFlags::new(best.objective_response, any_pd);

    let ttr = if best.objective_response {
        sequence
            .first_cycle_where(|response| response.is_objective())
            .unwrap_or(last_cycle)
    } else {
        last_cycle
    };
    let dor = if best.objective_response {
        last_cycle.saturating_sub(ttr)
    } else {
        0
    };

    let ttr_status = TTR_STATUS_RULES.evaluate(&flags);
    let tir_status = TIR_STATUS_RULES.evaluate(&flags);
    let ttp_status = TTP_STATUS_RULES.evaluate(&flags);
    trace!(
        subject_id = sequence.subject_id(),
        ttr_rule = ttr_status.rule_id,
        tir_rule = tir_status.rule_id,
        ttp_rule = ttp_status.rule_id,
        "status rules evaluated"
    );

    Ok(VariantEndpoints {
        bor: best.bor,
        objective_response: best.objective_response,
        any_pd,
        last_cycle,
        ttr,
        dor,
        or_and_pd: flags.or_and_pd(),
        no_or_and_pd: flags.no_or_and_pd(),
        no_or_or_pd: flags.no_or_or_pd(),
        ttr_status: ttr_status.status,
        tir_status: tir_status.status,
        ttp: last_cycle,
        ttp_status: ttp_status.status,
        ttp_censored_at_response: if best.objective_response {
            ttr
        } else {
            last_cycle
        },
        sttr: ttr,
    })
}

/// Per-patient result of the first derivation phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientDerivation {
    pub subject_id: String,
    pub any_anp: bool,
    pub anp_cycle: Option<u32>,
    pub raw: VariantEndpoints,
    pub censored_at_anp: VariantEndpoints,
    pub while_on_treatment: CompetingEndpoint,
}

/// Derives both variants and the competing-risk endpoint for one patient.
pub fn derive_patient(
    sequence: &AssessmentSequence,
    resolution: &Resolution,
) -> Result<PatientDerivation> {
    let raw = derive_variant(sequence)?;
    let censored_at_anp = match resolution.anp_cycle {
        Some(anp_cycle) => derive_variant(&resolution.censored).map_err(|_| {
            DerivationError::NoAssessmentsBeforeNewTherapy {
                subject_id: sequence.subject_id().to_string(),
                anp_cycle,
            }
        })?,
        None => raw.clone(),
    };
    let while_on_treatment = while_on_treatment(&censored_at_anp, resolution);
    Ok(PatientDerivation {
        subject_id: sequence.subject_id().to_string(),
        any_anp: resolution.any_anp,
        anp_cycle: resolution.anp_cycle,
        raw,
        censored_at_anp,
        while_on_treatment,
    })
}

/// Progression with new therapy as a competing event.
///
/// Progression counts only when observed before the new therapy, so the
/// censored variant is used for both the PD flag and the time.
fn while_on_treatment(censored: &VariantEndpoints, resolution: &Resolution) -> CompetingEndpoint {
    if censored.any_pd {
        return CompetingEndpoint {
            time: censored.last_cycle,
            status: CompetingStatus::Progression,
        };
    }
    match resolution.anp_cycle {
        Some(anp_cycle) => CompetingEndpoint {
            time: anp_cycle,
            status: CompetingStatus::NewTherapy,
        },
        None => CompetingEndpoint {
            time: censored.last_cycle,
            status: CompetingStatus::Censored,
        },
    }
}

/// Cohort-wide maxima feeding substituted TTR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortReference {
    pub max_ttp: u32,
    pub max_ttp_censored_at_anp: u32,
}

impl CohortReference {
    /// Reduces the first-phase results to the cohort maxima.
    ///
    /// With [`CohortMaximum::Fixed`] both maxima take the supplied value,
    /// which must not be below any derived TTP.
    pub fn from_derivations(
        derivations: &[PatientDerivation],
        cohort_maximum: CohortMaximum,
    ) -> Result<Self> {
        let max_ttp = derivations
            .iter()
            .map(|derivation| derivation.raw.ttp)
            .max()
            .ok_or(DerivationError::EmptyCohort)?;
        let max_ttp_censored_at_anp = derivations
            .iter()
            .map(|derivation| derivation.censored_at_anp.ttp)
            .max()
            .unwrap_or(max_ttp);
        match cohort_maximum {
            CohortMaximum::Derived => Ok(Self {
                max_ttp,
                max_ttp_censored_at_anp,
            }),
            CohortMaximum::Fixed(fixed) => {
                let observed = max_ttp.max(max_ttp_censored_at_anp);
                if fixed < observed {
                    return Err(DerivationError::InvalidCohortMaximum { fixed, observed });
                }
                Ok(Self {
                    max_ttp: fixed,
                    max_ttp_censored_at_anp: fixed,
                })
            }
        }
    }
}

/// Substituted TTR: non-responders who progressed get the cohort maximum.
pub fn substituted_ttr(endpoints: &VariantEndpoints, cohort_max_ttp: u32) -> u32 {
    if endpoints.any_pd && !endpoints.objective_response {
        cohort_max_ttp
    } else {
        endpoints.ttr
    }
}

impl PatientDerivation {
    /// Completes the second phase for this patient.
    pub fn into_endpoints(self, cohort: &CohortReference) -> PatientEndpoints {
        let mut raw = self.raw;
        raw.sttr = substituted_ttr(&raw, cohort.max_ttp);
        let mut censored_at_anp = self.censored_at_anp;
        censored_at_anp.sttr = substituted_ttr(&censored_at_anp, cohort.max_ttp_censored_at_anp);
        PatientEndpoints {
            subject_id: self.subject_id,
            any_anp: self.any_anp,
            anp_cycle: self.anp_cycle,
            raw,
            censored_at_anp,
            while_on_treatment: self.while_on_treatment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercurrent::{CensorAtNewTherapy, IntercurrentStrategy};
    use onco_model::{EventStatus, InterventionRecord, TtrStatus};
    use Response::{Complete as CR, Partial as PR, Progressive as PD, Stable as SD};

    fn sequence(values: &[Option<Response>]) -> AssessmentSequence {
        AssessmentSequence::from_responses("P01", values)
    }

    fn derive(values: &[Option<Response>]) -> VariantEndpoints {
        derive_variant(&sequence(values)).unwrap()
    }

    #[test]
    fn responder_who_progresses() {
        let ep = derive(&[Some(SD), Some(SD), Some(PR), Some(PD)]);
        assert_eq!(ep.bor, PR);
        assert!(ep.objective_response);
        assert_eq!(ep.ttr, 3);
        assert_eq!(ep.last_cycle, 4);
        assert_eq!(ep.dor, 1);
        assert_eq!(ep.ttr_status, TtrStatus::Response);
        assert!(ep.any_pd);
        assert!(ep.or_and_pd);
        assert_eq!(ep.tir_status, EventStatus::Event);
        assert_eq!(ep.ttp_censored_at_response, 3);
    }

    #[test]
    fn stable_without_progression() {
        let ep = derive(&[Some(SD), Some(SD), Some(SD)]);
        assert_eq!(ep.bor, SD);
        assert!(!ep.objective_response);
        assert_eq!(ep.ttr, 3);
        assert_eq!(ep.dor, 0);
        assert_eq!(ep.ttr_status, TtrStatus::Censored);
        assert_eq!(ep.tir_status, EventStatus::Event);
        assert!(ep.no_or_or_pd);
    }

    #[test]
    fn early_progression() {
        let ep = derive(&[Some(SD), Some(PD)]);
        assert_eq!(ep.bor, SD);
        assert!(!ep.objective_response);
        assert!(ep.any_pd);
        assert_eq!(ep.ttr_status, TtrStatus::ProgressionWithoutResponse);
        assert_eq!(ep.tir_status, EventStatus::Event);
        assert_eq!(ep.ttp, 2);
        assert_eq!(ep.ttp_status, EventStatus::Event);
    }

    #[test]
    fn progression_only_defaults_to_pd() {
        let ep = derive(&[None, Some(PD)]);
        assert_eq!(ep.bor, PD);
        assert_eq!(ep.last_cycle, 2);
        assert_eq!(ep.ttr_status, TtrStatus::ProgressionWithoutResponse);
    }

    #[test]
    fn responder_without_progression_is_censored_in_response() {
        let ep = derive(&[Some(PR), Some(CR), Some(CR), None]);
        assert_eq!(ep.bor, CR);
        assert_eq!(ep.ttr, 1);
        assert_eq!(ep.last_cycle, 3);
        assert_eq!(ep.dor, 2);
        assert_eq!(ep.tir_status, EventStatus::Censored);
        assert_eq!(ep.ttp_status, EventStatus::Censored);
    }

    #[test]
    fn no_assessments_is_rejected() {
        let err = derive_variant(&sequence(&[None, None])).unwrap_err();
        assert_eq!(
            err,
            DerivationError::NoAssessments {
                subject_id: "P01".to_string()
            }
        );
    }

    #[test]
    fn new_therapy_shortens_censored_follow_up() {
        let seq = sequence(&[Some(SD), Some(PR), Some(PR), Some(PR), None]);
        let record = InterventionRecord::started_at("P01", 4);
        let resolution = CensorAtNewTherapy.resolve(&seq, Some(&record));
        let derivation = derive_patient(&seq, &resolution).unwrap();
        assert_eq!(derivation.raw.last_cycle, 4);
        assert_eq!(derivation.censored_at_anp.last_cycle, 3);
        assert_eq!(derivation.raw.dor, 2);
        assert_eq!(derivation.censored_at_anp.dor, 1);
        assert_eq!(
            derivation.while_on_treatment,
            CompetingEndpoint {
                time: 4,
                status: CompetingStatus::NewTherapy
            }
        );
    }

    #[test]
    fn progression_before_new_therapy_is_the_competing_event() {
        let seq = sequence(&[Some(SD), Some(PD), None, None]);
        let record = InterventionRecord::started_at("P01", 3);
        let resolution = CensorAtNewTherapy.resolve(&seq, Some(&record));
        let derivation = derive_patient(&seq, &resolution).unwrap();
        assert_eq!(
            derivation.while_on_treatment,
            CompetingEndpoint {
                time: 2,
                status: CompetingStatus::Progression
            }
        );
    }

    #[test]
    fn new_therapy_before_any_assessment_is_rejected() {
        let seq = sequence(&[Some(SD), Some(SD)]);
        let record = InterventionRecord::started_at("P01", 1);
        let resolution = CensorAtNewTherapy.resolve(&seq, Some(&record));
        let err = derive_patient(&seq, &resolution).unwrap_err();
        assert_eq!(
            err,
            DerivationError::NoAssessmentsBeforeNewTherapy {
                subject_id: "P01".to_string(),
                anp_cycle: 1
            }
        );
    }

    #[test]
    fn cohort_pass_substitutes_for_progressing_non_responders() {
        let progressor = AssessmentSequence::from_responses("P01", &[Some(SD), Some(PD)]);
        let responder =
            AssessmentSequence::from_responses("P02", &[Some(SD), Some(PR), Some(PR), Some(PR)]);
        let derivations: Vec<_> = [progressor, responder]
            .iter()
            .map(|seq| derive_patient(seq, &Resolution::unaffected(seq)).unwrap())
            .collect();
        let cohort = CohortReference::from_derivations(&derivations, CohortMaximum::Derived).unwrap();
        assert_eq!(cohort.max_ttp, 4);
        let endpoints: Vec<_> = derivations
            .into_iter()
            .map(|derivation| derivation.into_endpoints(&cohort))
            .collect();
        assert_eq!(endpoints[0].raw.ttr, 2);
        assert_eq!(endpoints[0].raw.sttr, 4);
        assert_eq!(endpoints[1].raw.sttr, endpoints[1].raw.ttr);
    }

    #[test]
    fn fixed_cohort_maximum_must_cover_observed_ttp() {
        let seq = AssessmentSequence::from_responses("P01", &[Some(SD), Some(SD), Some(PD)]);
        let derivations = vec![derive_patient(&seq, &Resolution::unaffected(&seq)).unwrap()];
        let err = CohortReference::from_derivations(&derivations, CohortMaximum::Fixed(2))
            .unwrap_err();
        assert_eq!(
            err,
            DerivationError::InvalidCohortMaximum {
                fixed: 2,
                observed: 3
            }
        );
        let cohort =
            CohortReference::from_derivations(&derivations, CohortMaximum::Fixed(10)).unwrap();
        assert_eq!(cohort.max_ttp, 10);
    }

    #[test]
    fn empty_cohort_has_no_reference() {
        let err = CohortReference::from_derivations(&[], CohortMaximum::Derived).unwrap_err();
        assert_eq!(err, DerivationError::EmptyCohort);
    }
}

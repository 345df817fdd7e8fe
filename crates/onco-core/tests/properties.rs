//! Property tests for per-patient and cohort derivation.

use onco_core::{
    CensorAtNewTherapy, CohortReference, DerivationError, IntercurrentStrategy, Resolution,
    derive_patient, derive_variant,
};
use onco_model::{
    AssessmentSequence, CohortMaximum, InterventionRecord, Response, TtrStatus,
};
use proptest::prelude::*;

fn response() -> impl Strategy<Value = Response> {
    prop_oneof![
        Just(Response::Complete),
        Just(Response::Partial),
        Just(Response::Stable),
        Just(Response::Progressive),
    ]
}

fn observed_sequence() -> impl Strategy<Value = Vec<Option<Response>>> {
    prop::collection::vec(prop::option::weighted(0.8, response()), 1..12)
        .prop_filter("needs one recorded assessment", |values| {
            values.iter().any(Option::is_some)
        })
}

proptest! {
    #[test]
    fn bor_is_highest_priority_category(values in observed_sequence()) {
        let seq = AssessmentSequence::from_responses("P01", &values);
        let endpoints = derive_variant(&seq).unwrap();
        let expected = Response::ALL
            .into_iter()
            .find(|category| values.contains(&Some(*category)))
            .unwrap_or(Response::Progressive);
        prop_assert_eq!(endpoints.bor, expected);
        prop_assert_eq!(endpoints.objective_response, expected.is_objective());
        if !endpoints.objective_response {
            prop_assert_eq!(endpoints.dor, 0);
            prop_assert_eq!(endpoints.ttr, endpoints.last_cycle);
        }
    }

    #[test]
    fn ttr_status_matches_flags(values in observed_sequence()) {
        let seq = AssessmentSequence::from_responses("P01", &values);
        let endpoints = derive_variant(&seq).unwrap();
        match endpoints.ttr_status {
            TtrStatus::Response => prop_assert!(endpoints.objective_response),
            TtrStatus::ProgressionWithoutResponse => {
                prop_assert!(!endpoints.objective_response && endpoints.any_pd);
            }
            TtrStatus::Censored => {
                prop_assert!(!endpoints.objective_response && !endpoints.any_pd);
            }
        }
    }

    #[test]
    fn censoring_never_extends_follow_up(
        values in observed_sequence(),
        anp_cycle in prop::option::of(1u32..14),
    ) {
        let seq = AssessmentSequence::from_responses("P01", &values);
        let record = anp_cycle.map(|cycle| InterventionRecord::started_at("P01", cycle));
        let resolution = CensorAtNewTherapy.resolve(&seq, record.as_ref());
        match derive_patient(&seq, &resolution) {
            Ok(derivation) => {
                prop_assert!(derivation.censored_at_anp.last_cycle <= derivation.raw.last_cycle);
                prop_assert!(derivation.censored_at_anp.dor <= derivation.raw.dor);
                if !derivation.any_anp {
                    prop_assert_eq!(
                        derivation.censored_at_anp.last_cycle,
                        derivation.raw.last_cycle
                    );
                }
            }
            Err(err) => {
                let is_expected = matches!(
                    err,
                    DerivationError::NoAssessmentsBeforeNewTherapy { .. }
                );
                prop_assert!(is_expected);
            }
        }
    }

    #[test]
    fn substitution_only_raises_ttr(
        cohort in prop::collection::vec(observed_sequence(), 1..8),
    ) {
        let derivations: Vec<_> = cohort
            .iter()
            .enumerate()
            .map(|(idx, values)| {
                let seq = AssessmentSequence::from_responses(format!("P{idx:02}"), values);
                derive_patient(&seq, &Resolution::unaffected(&seq)).unwrap()
            })
            .collect();
        let reference =
            CohortReference::from_derivations(&derivations, CohortMaximum::Derived).unwrap();
        for derivation in derivations {
            let endpoints = derivation.into_endpoints(&reference);
            let raw = &endpoints.raw;
            if raw.any_pd && !raw.objective_response {
                prop_assert!(raw.sttr >= raw.ttr);
                prop_assert_eq!(raw.sttr, reference.max_ttp);
            } else {
                prop_assert_eq!(raw.sttr, raw.ttr);
            }
        }
    }

    #[test]
    fn derivation_is_deterministic(values in observed_sequence()) {
        let seq = AssessmentSequence::from_responses("P01", &values);
        let first = derive_variant(&seq).unwrap();
        let second = derive_variant(&seq.clone()).unwrap();
        prop_assert_eq!(first, second);
    }
}

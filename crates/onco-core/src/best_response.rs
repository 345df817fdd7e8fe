//! Best overall response.

use onco_model::{AssessmentSequence, Response};

/// Best overall response of one assessment sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestResponse {
    pub bor: Response,
    /// CR or PR observed.
    pub objective_response: bool,
}

/// Reduces a sequence to its best response (CR > PR > SD > PD).
///
/// Only which categories occur matters, not their order. Missing visits are
/// ignored, and PD is returned when no CR, PR or SD occurs, including for a
/// sequence with no recorded assessment.
pub fn classify(sequence: &AssessmentSequence) -> BestResponse {
    let bor = sequence
        .observed()
        .map(|(_, response)| response)
        .min()
        .unwrap_or(Response::Progressive);
    BestResponse {
        bor,
        objective_response: bor.is_objective(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_values(values: &[Option<Response>]) -> BestResponse {
        classify(&AssessmentSequence::from_responses("P01", values))
    }

    #[test]
    fn complete_response_wins() {
        let best = classify_values(&[
            Some(Response::Partial),
            Some(Response::Complete),
            Some(Response::Progressive),
        ]);
        assert_eq!(best.bor, Response::Complete);
        assert!(best.objective_response);
    }

    #[test]
    fn stable_disease_is_not_objective() {
        let best = classify_values(&[Some(Response::Stable), None, Some(Response::Stable)]);
        assert_eq!(best.bor, Response::Stable);
        assert!(!best.objective_response);
    }

    #[test]
    fn all_missing_defaults_to_progression() {
        let best = classify_values(&[None, None]);
        assert_eq!(best.bor, Response::Progressive);
        assert!(!best.objective_response);
    }
}

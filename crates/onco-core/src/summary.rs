//! Cohort-level counts for reporting.

use serde::Serialize;

use onco_model::{PatientEndpoints, Response};

use crate::pipeline::CohortDerivation;

/// Number of patients per best overall response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BorCounts {
    pub complete: usize,
    pub partial: usize,
    pub stable: usize,
    pub progressive: usize,
}

impl BorCounts {
    pub fn get(&self, response: Response) -> usize {
        match response {
            Response::Complete => self.complete,
            Response::Partial => self.partial,
            Response::Stable => self.stable,
            Response::Progressive => self.progressive,
        }
    }

    fn add(&mut self, response: Response) {
        match response {
            Response::Complete => self.complete += 1,
            Response::Partial => self.partial += 1,
            Response::Stable => self.stable += 1,
            Response::Progressive => self.progressive += 1,
        }
    }
}

/// Summary of one derivation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohortSummary {
    pub derived: usize,
    pub excluded: usize,
    pub warnings: usize,
    pub bor: BorCounts,
    pub objective_responses: usize,
    pub progressions: usize,
    pub new_therapy: usize,
    pub max_ttp: u32,
}

impl CohortSummary {
    pub fn from_endpoints(endpoints: &[PatientEndpoints]) -> Self {
        let mut summary = Self {
            derived: endpoints.len(),
            ..Self::default()
        };
        for patient in endpoints {
            summary.bor.add(patient.bor());
            if patient.objective_response() {
                summary.objective_responses += 1;
            }
            if patient.raw.any_pd {
                summary.progressions += 1;
            }
            if patient.any_anp {
                summary.new_therapy += 1;
            }
            summary.max_ttp = summary.max_ttp.max(patient.raw.ttp);
        }
        summary
    }

    pub fn from_derivation(derivation: &CohortDerivation) -> Self {
        Self {
            excluded: derivation.excluded.len(),
            warnings: derivation.report.warning_count(),
            max_ttp: derivation.cohort.max_ttp,
            ..Self::from_endpoints(&derivation.endpoints)
        }
    }

    /// Objective response rate among derived patients.
    pub fn orr(&self) -> f64 {
        if self.derived == 0 {
            0.0
        } else {
            self.objective_responses as f64 / self.derived as f64
        }
    }
}

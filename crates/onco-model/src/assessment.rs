//! Per-patient assessment and intervention sequences.

use serde::{Deserialize, Serialize};

use crate::response::Response;

/// One visit of an assessment sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub cycle: u32,
    /// `None` when no assessment was recorded at this visit.
    pub response: Option<Response>,
}

impl Assessment {
    pub fn new(cycle: u32, response: Option<Response>) -> Self {
        Self { cycle, response }
    }
}

/// A patient's assessments ordered by cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSequence {
    subject_id: String,
    assessments: Vec<Assessment>,
}

impl AssessmentSequence {
    /// Creates a sequence; visits are sorted by cycle.
    pub fn new(subject_id: impl Into<String>, mut assessments: Vec<Assessment>) -> Self {
        assessments.sort_by_key(|assessment| assessment.cycle);
        Self {
            subject_id: subject_id.into(),
            assessments,
        }
    }

    /// Builds a sequence from consecutive cycles starting at 1.
    pub fn from_responses(subject_id: impl Into<String>, responses: &[Option<Response>]) -> Self {
        let assessments = responses
            .iter()
            .enumerate()
            .map(|(idx, response)| Assessment::new(idx as u32 + 1, *response))
            .collect();
        Self::new(subject_id, assessments)
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn assessments(&self) -> &[Assessment] {
        &self.assessments
    }

    /// Iterates over recorded (non-missing) assessments as `(cycle, response)`.
    pub fn observed(&self) -> impl Iterator<Item = (u32, Response)> + '_ {
        self.assessments
            .iter()
            .filter_map(|assessment| assessment.response.map(|r| (assessment.cycle, r)))
    }

    pub fn has_observations(&self) -> bool {
        self.observed().next().is_some()
    }

    /// Cycle of the last recorded assessment.
    pub fn last_observed_cycle(&self) -> Option<u32> {
        self.observed().map(|(cycle, _)| cycle).last()
    }

    /// Cycle of the first recorded assessment satisfying `predicate`.
    pub fn first_cycle_where(&self, predicate: impl Fn(Response) -> bool) -> Option<u32> {
        self.observed()
            .find(|(_, response)| predicate(*response))
            .map(|(cycle, _)| cycle)
    }

    pub fn contains(&self, response: Response) -> bool {
        self.observed().any(|(_, observed)| observed == response)
    }

    /// Cycles with a recorded assessment at or after `cycle`.
    pub fn observed_from(&self, cycle: u32) -> Vec<u32> {
        self.observed()
            .map(|(observed, _)| observed)
            .filter(|observed| *observed >= cycle)
            .collect()
    }

    /// Returns a copy with every assessment at or after `cycle` set to missing.
    ///
    /// Visits are kept so the copy stays aligned with the source schedule.
    pub fn censored_from(&self, cycle: u32) -> Self {
        let assessments = self
            .assessments
            .iter()
            .map(|assessment| {
                if assessment.cycle >= cycle {
                    Assessment::new(assessment.cycle, None)
                } else {
                    *assessment
                }
            })
            .collect();
        Self {
            subject_id: self.subject_id.clone(),
            assessments,
        }
    }
}

/// One visit of an intervention record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionMark {
    pub cycle: u32,
    /// True when a new anti-cancer therapy started at this cycle.
    pub started: bool,
}

/// A patient's new-therapy flags ordered by cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionRecord {
    subject_id: String,
    marks: Vec<InterventionMark>,
}

impl InterventionRecord {
    pub fn new(subject_id: impl Into<String>, mut marks: Vec<InterventionMark>) -> Self {
        marks.sort_by_key(|mark| mark.cycle);
        Self {
            subject_id: subject_id.into(),
            marks,
        }
    }

    /// Record with a single new-therapy start at `cycle`.
    pub fn started_at(subject_id: impl Into<String>, cycle: u32) -> Self {
        Self::new(
            subject_id,
            vec![InterventionMark {
                cycle,
                started: true,
            }],
        )
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn marks(&self) -> &[InterventionMark] {
        &self.marks
    }

    /// First cycle flagged as a new-therapy start. Later flags are ignored.
    pub fn first_start_cycle(&self) -> Option<u32> {
        self.marks
            .iter()
            .find(|mark| mark.started)
            .map(|mark| mark.cycle)
    }
}

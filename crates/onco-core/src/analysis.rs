//! Analysis datasets: derived endpoints projected onto one estimand.

use serde::Serialize;

use onco_model::PatientEndpoints;

use crate::estimand::EstimandStrategy;
use crate::schedule::VisitSchedule;

/// One subject of an analysis dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub subject_id: String,
    pub time_cycles: u32,
    pub time_months: f64,
    pub status: u8,
}

/// Time and status per subject, ready for a survival or competing-risk fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisDataset {
    pub strategy: EstimandStrategy,
    pub records: Vec<AnalysisRecord>,
}

impl AnalysisDataset {
    /// Applies the population filter and picks the time and status fields.
    pub fn extract(
        strategy: EstimandStrategy,
        endpoints: &[PatientEndpoints],
        schedule: &VisitSchedule,
    ) -> Self {
        let records = endpoints
            .iter()
            .filter(|patient| {
                strategy
                    .population
                    .includes(patient.variant(strategy.variant))
            })
            .map(|patient| {
                let time_cycles = strategy.time.cycles(patient, strategy.variant);
                AnalysisRecord {
                    subject_id: patient.subject_id.clone(),
                    time_cycles,
                    time_months: schedule.months(time_cycles),
                    status: strategy.event.status(patient, strategy.variant),
                }
            })
            .collect();
        Self { strategy, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records with a non-zero status.
    pub fn event_count(&self) -> usize {
        self.records.iter().filter(|record| record.status != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimand::{Estimand, select};
    use crate::pipeline::{CohortInput, DerivationEngine};
    use onco_model::WideTable;

    fn derived() -> crate::pipeline::CohortDerivation {
        let mut assessments = WideTable::new(
            "ID",
            vec!["C1".to_string(), "C2".to_string(), "C3".to_string()],
        );
        for (id, cells) in [
            ("P01", ["SD", "PR", "PD"]),
            ("P02", ["SD", "SD", "SD"]),
            ("P03", ["SD", "PD", ""]),
        ] {
            assessments.push_row(id, cells.iter().map(|cell| (*cell).to_string()).collect());
        }
        DerivationEngine::default()
            .derive(&CohortInput::new(assessments))
            .unwrap()
    }

    #[test]
    fn conditional_dor_keeps_responders_only() {
        let derived = derived();
        let dataset = AnalysisDataset::extract(
            Estimand::DorConditionalTreatmentPolicy.strategy(),
            &derived.endpoints,
            &derived.schedule,
        );
        assert_eq!(dataset.len(), 1);
        let record = &dataset.records[0];
        assert_eq!(record.subject_id, "P01");
        assert_eq!(record.time_cycles, 1);
        assert_eq!(record.status, 1);
    }

    #[test]
    fn competing_ttr_uses_status_codes() {
        let derived = derived();
        let dataset = AnalysisDataset::extract(
            select("ttr-competing-risks").unwrap(),
            &derived.endpoints,
            &derived.schedule,
        );
        let statuses: Vec<u8> = dataset.records.iter().map(|record| record.status).collect();
        assert_eq!(statuses, vec![1, 0, 2]);
        assert_eq!(dataset.event_count(), 2);
    }

    #[test]
    fn months_follow_schedule() {
        let derived = derived();
        let dataset = AnalysisDataset::extract(
            Estimand::TtpTreatmentPolicy.strategy(),
            &derived.endpoints,
            &derived.schedule,
        );
        let p02 = &dataset.records[1];
        assert_eq!(p02.time_cycles, 3);
        assert!((p02.time_months - derived.schedule.months(3)).abs() < f64::EPSILON);
    }
}

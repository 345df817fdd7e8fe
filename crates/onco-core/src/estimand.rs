//! Estimand strategy selector.
//!
//! Maps a named estimand to the variant, time field, event field and
//! population consumed by downstream survival or competing-risk fitting.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use onco_model::{PatientEndpoints, Variant, VariantEndpoints};

use crate::error::{DerivationError, Result};

/// Supported estimands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Estimand {
    TtrTreatmentPolicy,
    TtrHypothetical,
    TtrCompetingRisks,
    TtrSubstitutedTreatmentPolicy,
    DorConditionalTreatmentPolicy,
    DorConditionalHypothetical,
    TimeInResponse,
    TtpTreatmentPolicy,
    TtpHypothetical,
    TtpCensoredAtResponse,
    TtpWhileOnTreatmentCompetingRisks,
}

impl Estimand {
    pub const ALL: [Estimand; 11] = [
        Estimand::TtrTreatmentPolicy,
        Estimand::TtrHypothetical,
        Estimand::TtrCompetingRisks,
        Estimand::TtrSubstitutedTreatmentPolicy,
        Estimand::DorConditionalTreatmentPolicy,
        Estimand::DorConditionalHypothetical,
        Estimand::TimeInResponse,
        Estimand::TtpTreatmentPolicy,
        Estimand::TtpHypothetical,
        Estimand::TtpCensoredAtResponse,
        Estimand::TtpWhileOnTreatmentCompetingRisks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Estimand::TtrTreatmentPolicy => "ttr-treatment-policy",
            Estimand::TtrHypothetical => "ttr-hypothetical",
            Estimand::TtrCompetingRisks => "ttr-competing-risks",
            Estimand::TtrSubstitutedTreatmentPolicy => "ttr-substituted-treatment-policy",
            Estimand::DorConditionalTreatmentPolicy => "dor-conditional-treatment-policy",
            Estimand::DorConditionalHypothetical => "dor-conditional-hypothetical",
            Estimand::TimeInResponse => "time-in-response",
            Estimand::TtpTreatmentPolicy => "ttp-treatment-policy",
            Estimand::TtpHypothetical => "ttp-hypothetical",
            Estimand::TtpCensoredAtResponse => "ttp-censored-at-response",
            Estimand::TtpWhileOnTreatmentCompetingRisks => {
                "ttp-while-on-treatment-competing-risks"
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Estimand::TtrTreatmentPolicy => "Time to response, all assessments",
            Estimand::TtrHypothetical => "Time to response, censored at new therapy",
            Estimand::TtrCompetingRisks => "Time to response with progression as competing event",
            Estimand::TtrSubstitutedTreatmentPolicy => {
                "Time to response, progressing non-responders at cohort maximum"
            }
            Estimand::DorConditionalTreatmentPolicy => "Duration of response among responders",
            Estimand::DorConditionalHypothetical => {
                "Duration of response among responders, censored at new therapy"
            }
            Estimand::TimeInResponse => "Time in response over all patients",
            Estimand::TtpTreatmentPolicy => "Time to progression, all assessments",
            Estimand::TtpHypothetical => "Time to progression, censored at new therapy",
            Estimand::TtpCensoredAtResponse => "Time to progression, censored at response",
            Estimand::TtpWhileOnTreatmentCompetingRisks => {
                "Time to progression with new therapy as competing event"
            }
        }
    }

    /// Variant, fields and population for this estimand.
    pub fn strategy(&self) -> EstimandStrategy {
        use EventField as E;
        use Population as P;
        use TimeField as T;
        let (variant, time, event, population) = match self {
            Estimand::TtrTreatmentPolicy => (Variant::Raw, T::Ttr, E::Response, P::All),
            Estimand::TtrHypothetical => (Variant::CensoredAtAnp, T::Ttr, E::Response, P::All),
            Estimand::TtrCompetingRisks => (Variant::Raw, T::Ttr, E::TtrStatus, P::All),
            Estimand::TtrSubstitutedTreatmentPolicy => {
                (Variant::Raw, T::Sttr, E::Response, P::All)
            }
            Estimand::DorConditionalTreatmentPolicy => {
                (Variant::Raw, T::Dor, E::TtpStatus, P::Responders)
            }
            Estimand::DorConditionalHypothetical => {
                (Variant::CensoredAtAnp, T::Dor, E::TtpStatus, P::Responders)
            }
            Estimand::TimeInResponse => (Variant::Raw, T::Dor, E::TirStatus, P::All),
            Estimand::TtpTreatmentPolicy => (Variant::Raw, T::Ttp, E::TtpStatus, P::All),
            Estimand::TtpHypothetical => (Variant::CensoredAtAnp, T::Ttp, E::TtpStatus, P::All),
            Estimand::TtpCensoredAtResponse => (
                Variant::Raw,
                T::TtpCensoredAtResponse,
                E::ProgressionBeforeResponse,
                P::All,
            ),
            Estimand::TtpWhileOnTreatmentCompetingRisks => {
                (Variant::Raw, T::WhileOnTreatment, E::WhileOnTreatment, P::All)
            }
        };
        EstimandStrategy {
            estimand: *self,
            variant,
            time,
            event,
            population,
        }
    }
}

impl fmt::Display for Estimand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Estimand {
    type Err = DerivationError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Estimand::ALL
            .into_iter()
            .find(|estimand| estimand.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DerivationError::UnsupportedEstimand {
                label: s.to_string(),
            })
    }
}

/// Time column an estimand is analysed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeField {
    Ttr,
    Sttr,
    Dor,
    Ttp,
    TtpCensoredAtResponse,
    WhileOnTreatment,
}

impl TimeField {
    pub fn cycles(&self, endpoints: &PatientEndpoints, variant: Variant) -> u32 {
        let values = endpoints.variant(variant);
        match self {
            TimeField::Ttr => values.ttr,
            TimeField::Sttr => values.sttr,
            TimeField::Dor => values.dor,
            TimeField::Ttp => values.ttp,
            TimeField::TtpCensoredAtResponse => values.ttp_censored_at_response,
            TimeField::WhileOnTreatment => endpoints.while_on_treatment.time,
        }
    }
}

/// Status column an estimand is analysed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    /// 1 when an objective response was observed.
    Response,
    /// Multi-level TTR status (0, 1, 2).
    TtrStatus,
    TirStatus,
    TtpStatus,
    /// 1 when progression occurred without a prior response.
    ProgressionBeforeResponse,
    /// Multi-level while-on-treatment status (0, 1, 2).
    WhileOnTreatment,
}

impl EventField {
    pub fn status(&self, endpoints: &PatientEndpoints, variant: Variant) -> u8 {
        let values = endpoints.variant(variant);
        match self {
            EventField::Response => u8::from(values.objective_response),
            EventField::TtrStatus => values.ttr_status.code(),
            EventField::TirStatus => values.tir_status.code(),
            EventField::TtpStatus => values.ttp_status.code(),
            EventField::ProgressionBeforeResponse => u8::from(values.no_or_and_pd),
            EventField::WhileOnTreatment => endpoints.while_on_treatment.status.code(),
        }
    }

    /// True for multi-level statuses fed to a competing-risk estimator.
    pub fn is_competing(&self) -> bool {
        matches!(self, EventField::TtrStatus | EventField::WhileOnTreatment)
    }
}

/// Patients included in an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    All,
    /// Patients with an objective response in the analysed variant.
    Responders,
}

impl Population {
    pub fn includes(&self, endpoints: &VariantEndpoints) -> bool {
        match self {
            Population::All => true,
            Population::Responders => endpoints.objective_response,
        }
    }
}

/// Resolved analysis strategy for one estimand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EstimandStrategy {
    pub estimand: Estimand,
    pub variant: Variant,
    pub time: TimeField,
    pub event: EventField,
    pub population: Population,
}

impl EstimandStrategy {
    pub fn label(&self) -> &'static str {
        self.estimand.label()
    }
}

/// Looks up the strategy for an estimand label (case-insensitive).
pub fn select(label: &str) -> Result<EstimandStrategy> {
    label.parse::<Estimand>().map(|estimand| estimand.strategy())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_selects_its_estimand() {
        for estimand in Estimand::ALL {
            let strategy = select(estimand.label()).unwrap();
            assert_eq!(strategy.estimand, estimand);
        }
    }

    #[test]
    fn selection_ignores_case() {
        let strategy = select("DOR-Conditional-Hypothetical").unwrap();
        assert_eq!(strategy.variant, Variant::CensoredAtAnp);
        assert_eq!(strategy.time, TimeField::Dor);
        assert_eq!(strategy.population, Population::Responders);
    }

    #[test]
    fn unknown_label_is_reported() {
        let err = select("pfs-while-alive").unwrap_err();
        assert_eq!(
            err,
            DerivationError::UnsupportedEstimand {
                label: "pfs-while-alive".to_string()
            }
        );
    }

    #[test]
    fn competing_risk_estimands_use_multi_level_status() {
        let competing: Vec<_> = Estimand::ALL
            .into_iter()
            .filter(|estimand| estimand.strategy().event.is_competing())
            .collect();
        assert_eq!(
            competing,
            vec![
                Estimand::TtrCompetingRisks,
                Estimand::TtpWhileOnTreatmentCompetingRisks
            ]
        );
    }
}

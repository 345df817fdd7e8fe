//! Derived per-patient endpoints.
//!
//! Status codes serialize as the integer codes survival and competing-risk
//! estimators expect (`0` = censored).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;
use crate::response::Response;

/// Competing-risk status for time to response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TtrStatus {
    /// No response and no progression observed.
    Censored,
    /// Objective response observed.
    Response,
    /// Progression observed without a prior response.
    ProgressionWithoutResponse,
}

impl TtrStatus {
    pub fn code(self) -> u8 {
        match self {
            TtrStatus::Censored => 0,
            TtrStatus::Response => 1,
            TtrStatus::ProgressionWithoutResponse => 2,
        }
    }
}

impl From<TtrStatus> for u8 {
    fn from(status: TtrStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for TtrStatus {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TtrStatus::Censored),
            1 => Ok(TtrStatus::Response),
            2 => Ok(TtrStatus::ProgressionWithoutResponse),
            _ => Err(ModelError::InvalidStatusCode { kind: "ttr", code }),
        }
    }
}

/// Binary event indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum EventStatus {
    Censored,
    Event,
}

impl EventStatus {
    pub fn code(self) -> u8 {
        match self {
            EventStatus::Censored => 0,
            EventStatus::Event => 1,
        }
    }

    pub fn from_flag(event: bool) -> Self {
        if event {
            EventStatus::Event
        } else {
            EventStatus::Censored
        }
    }

    pub fn is_event(self) -> bool {
        matches!(self, EventStatus::Event)
    }
}

impl From<EventStatus> for u8 {
    fn from(status: EventStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for EventStatus {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EventStatus::Censored),
            1 => Ok(EventStatus::Event),
            _ => Err(ModelError::InvalidStatusCode {
                kind: "event",
                code,
            }),
        }
    }
}

/// Competing-risk status for progression while on study treatment, where
/// starting a new therapy competes with progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CompetingStatus {
    Censored,
    Progression,
    NewTherapy,
}

impl CompetingStatus {
    pub fn code(self) -> u8 {
        match self {
            CompetingStatus::Censored => 0,
            CompetingStatus::Progression => 1,
            CompetingStatus::NewTherapy => 2,
        }
    }
}

impl From<CompetingStatus> for u8 {
    fn from(status: CompetingStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for CompetingStatus {
    type Error = ModelError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CompetingStatus::Censored),
            1 => Ok(CompetingStatus::Progression),
            2 => Ok(CompetingStatus::NewTherapy),
            _ => Err(ModelError::InvalidStatusCode {
                kind: "competing",
                code,
            }),
        }
    }
}

/// Which copy of the assessment sequence a set of endpoints was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// All recorded assessments (treatment-policy view).
    Raw,
    /// Assessments at or after the new-therapy cycle removed (hypothetical view).
    CensoredAtAnp,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Raw => "raw",
            Variant::CensoredAtAnp => "censored_at_anp",
        }
    }

    /// Suffix appended to output column names for this variant.
    pub fn column_suffix(&self) -> &'static str {
        match self {
            Variant::Raw => "",
            Variant::CensoredAtAnp => "_censored_at_anp",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Endpoints derived from one variant of a patient's assessment sequence.
///
/// All times are in cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEndpoints {
    pub bor: Response,
    pub objective_response: bool,
    pub any_pd: bool,
    pub last_cycle: u32,
    pub ttr: u32,
    pub dor: u32,
    pub or_and_pd: bool,
    pub no_or_and_pd: bool,
    pub no_or_or_pd: bool,
    pub ttr_status: TtrStatus,
    pub tir_status: EventStatus,
    pub ttp: u32,
    pub ttp_status: EventStatus,
    pub ttp_censored_at_response: u32,
    /// Substituted TTR; depends on the cohort maximum TTP.
    pub sttr: u32,
}

/// Time and status for progression with new therapy as a competing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetingEndpoint {
    pub time: u32,
    pub status: CompetingStatus,
}

/// All derived endpoints for a single patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientEndpoints {
    pub subject_id: String,
    pub any_anp: bool,
    pub anp_cycle: Option<u32>,
    pub raw: VariantEndpoints,
    pub censored_at_anp: VariantEndpoints,
    pub while_on_treatment: CompetingEndpoint,
}

impl PatientEndpoints {
    pub fn variant(&self, variant: Variant) -> &VariantEndpoints {
        match variant {
            Variant::Raw => &self.raw,
            Variant::CensoredAtAnp => &self.censored_at_anp,
        }
    }

    pub fn bor(&self) -> Response {
        self.raw.bor
    }

    pub fn objective_response(&self) -> bool {
        self.raw.objective_response
    }

    pub fn last_cycle(&self) -> u32 {
        self.raw.last_cycle
    }

    pub fn last_cycle_censored_at_anp(&self) -> u32 {
        self.censored_at_anp.last_cycle
    }

    pub fn ttr(&self) -> u32 {
        self.raw.ttr
    }

    pub fn ttr_censored_at_anp(&self) -> u32 {
        self.censored_at_anp.ttr
    }

    pub fn dor(&self) -> u32 {
        self.raw.dor
    }

    pub fn dor_censored_at_anp(&self) -> u32 {
        self.censored_at_anp.dor
    }
}

//! Categorical tumour-response values.
//!
//! Assessment tables record one of four response categories per visit, or
//! leave the cell empty when no assessment took place. The categories are
//! ordered by clinical preference: a complete response outranks a partial
//! response, which outranks stable disease, which outranks progression.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Response category of a single tumour assessment.
///
/// The derived `Ord` follows declaration order, so `Complete < Partial <
/// Stable < Progressive` and the minimum of a set is the best response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Response {
    /// CR: disappearance of all target lesions.
    #[serde(rename = "CR")]
    Complete,
    /// PR: at least 30% decrease in target lesion diameters.
    #[serde(rename = "PR")]
    Partial,
    /// SD: neither sufficient shrinkage nor sufficient growth.
    #[serde(rename = "SD")]
    Stable,
    /// PD: progressive disease.
    #[serde(rename = "PD")]
    Progressive,
}

impl Response {
    /// All categories in priority order (best first).
    pub const ALL: [Response; 4] = [
        Response::Complete,
        Response::Partial,
        Response::Stable,
        Response::Progressive,
    ];

    /// Returns the short code as it appears in assessment tables.
    pub fn as_code(&self) -> &'static str {
        match self {
            Response::Complete => "CR",
            Response::Partial => "PR",
            Response::Stable => "SD",
            Response::Progressive => "PD",
        }
    }

    /// Returns the full category name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Response::Complete => "Complete Response",
            Response::Partial => "Partial Response",
            Response::Stable => "Stable Disease",
            Response::Progressive => "Progressive Disease",
        }
    }

    /// Returns true for CR and PR, the categories that count as objective response.
    pub fn is_objective(&self) -> bool {
        matches!(self, Response::Complete | Response::Partial)
    }

    /// Returns true for PD.
    pub fn is_progression(&self) -> bool {
        matches!(self, Response::Progressive)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

impl FromStr for Response {
    type Err = ModelError;

    /// Parse a response cell. Accepts the short codes and the full names
    /// (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "CR" | "COMPLETE RESPONSE" => Ok(Response::Complete),
            "PR" | "PARTIAL RESPONSE" => Ok(Response::Partial),
            "SD" | "STABLE DISEASE" => Ok(Response::Stable),
            "PD" | "PROGRESSIVE DISEASE" => Ok(Response::Progressive),
            _ => Err(ModelError::UnknownResponse(s.trim().to_string())),
        }
    }
}

/// Parse an optional response cell, treating empty text as a missing assessment.
pub fn parse_response_cell(value: &str) -> Result<Option<Response>, ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NA") {
        return Ok(None);
    }
    trimmed.parse().map(Some)
}

/// Parse an intervention-table cell into a "new therapy started" flag.
///
/// Empty cells mean no intervention at that visit. The ANP marker and the
/// usual yes-tokens start a new therapy; explicit no-tokens are accepted as
/// false. Anything else is an error rather than a silent guess.
pub fn parse_intervention_cell(value: &str) -> Result<bool, ModelError> {
    let normalized = value.trim().to_uppercase();
    match normalized.as_str() {
        "" | "NA" | "N" | "NO" | "FALSE" | "0" => Ok(false),
        "ANP" | "Y" | "YES" | "TRUE" | "1" | "X" => Ok(true),
        _ => Err(ModelError::UnknownMarker(value.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_str() {
        assert_eq!("CR".parse::<Response>().unwrap(), Response::Complete);
        assert_eq!(" pr ".parse::<Response>().unwrap(), Response::Partial);
        assert_eq!(
            "Stable Disease".parse::<Response>().unwrap(),
            Response::Stable
        );
        assert!("NE".parse::<Response>().is_err());
    }

    #[test]
    fn test_response_ordering_is_priority() {
        assert!(Response::Complete < Response::Partial);
        assert!(Response::Partial < Response::Stable);
        assert!(Response::Stable < Response::Progressive);
    }

    #[test]
    fn test_empty_cells_are_missing() {
        assert_eq!(parse_response_cell("").unwrap(), None);
        assert_eq!(parse_response_cell("  ").unwrap(), None);
        assert_eq!(parse_response_cell("PD").unwrap(), Some(Response::Progressive));
    }

    #[test]
    fn test_intervention_markers() {
        assert!(parse_intervention_cell("ANP").unwrap());
        assert!(parse_intervention_cell("anp").unwrap());
        assert!(!parse_intervention_cell("").unwrap());
        assert_eq!(
            parse_intervention_cell("maybe"),
            Err(ModelError::UnknownMarker("maybe".to_string()))
        );
    }
}

//! Outcome of the eligibility gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing-identity field that is not set up yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissingField {
    /// Display/delegate name or title
    #[serde(rename = "name/title")]
    NameTitle,
    /// Signature reference
    #[serde(rename = "signature")]
    Signature,
}

impl MissingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameTitle => "name/title",
            Self::Signature => "signature",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setup area the actor has to complete before approving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "area", rename_all = "snake_case")]
pub enum SetupArea {
    /// The actor's own verifier profile
    PersonalProfile,
    /// The delegate configuration of an institution
    InstitutionConfiguration { institution_id: String },
}

impl fmt::Display for SetupArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PersonalProfile => f.write_str("personal verifier profile"),
            Self::InstitutionConfiguration { institution_id } => {
                write!(f, "institution configuration ({institution_id})")
            }
        }
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityOutcome {
    Eligible,
    Ineligible {
        missing: Vec<MissingField>,
        setup_area: SetupArea,
    },
}

impl EligibilityOutcome {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    pub fn missing(&self) -> &[MissingField] {
        match self {
            Self::Eligible => &[],
            Self::Ineligible { missing, .. } => missing,
        }
    }

    /// Flat `{ eligible, missing, setup_area }` shape for JSON output.
    pub fn to_report(&self) -> EligibilityReport {
        match self {
            Self::Eligible => EligibilityReport {
                eligible: true,
                missing: Vec::new(),
                setup_area: None,
            },
            Self::Ineligible {
                missing,
                setup_area,
            } => EligibilityReport {
                eligible: false,
                missing: missing.clone(),
                setup_area: Some(setup_area.clone()),
            },
        }
    }
}

/// Serializable view of an [`EligibilityOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityReport {
    pub eligible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<MissingField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_area: Option<SetupArea>,
}

/// Render missing fields as a comma-separated list.
pub fn format_missing(fields: &[MissingField]) -> String {
    fields
        .iter()
        .map(MissingField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

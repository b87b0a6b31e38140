//! Acting party: resolved role, capabilities and signing-identity source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Role assigned by the identity system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    Verifier,
    InstitutionDelegate,
    Village,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Verifier => "verifier",
            Self::InstitutionDelegate => "institution_delegate",
            Self::Village => "village",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "superadmin" => Some(Self::Superadmin),
            "verifier" => Some(Self::Verifier),
            "institution_delegate" | "institution-delegate" | "dinas" => {
                Some(Self::InstitutionDelegate)
            }
            "village" | "desa" => Some(Self::Village),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an actor is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Approve or send back proposals
    CanApprove,
    /// Edit verifier and institution setup records
    CanManage,
    /// Read a proposal's decision history
    CanViewHistory,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanApprove => "can_approve",
            Self::CanManage => "can_manage",
            Self::CanViewHistory => "can_view_history",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the signing identity for an approval comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EligibilitySource {
    /// The actor's own verifier profile
    Individual,
    /// The delegate configuration of an institution
    Institutional { institution_id: String },
}

/// Identity as handed over by the (external) session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorIdentity {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub institution_id: Option<String>,
}

/// Actor after capability resolution. Built once per session and passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub capabilities: BTreeSet<Capability>,
    pub eligibility_source: EligibilitySource,
}

impl ActorContext {
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Individual verifier's signing profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub signature_ref: Option<String>,
}

/// Institution's delegate signing configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionConfig {
    #[serde(default)]
    pub institution_id: String,
    #[serde(default)]
    pub delegate_name: Option<String>,
    #[serde(default)]
    pub delegate_title: Option<String>,
    #[serde(default)]
    pub signature_ref: Option<String>,
}

/// Signing setup handed to the eligibility gate. Exactly one variant applies per actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierEligibility {
    /// Individual path; `None` when no profile exists yet
    Individual(Option<VerifierProfile>),
    /// Institutional path; `None` when the institution has no configuration record
    Institutional {
        institution_id: String,
        config: Option<InstitutionConfig>,
    },
}

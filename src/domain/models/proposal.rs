//! Proposal domain model.
//!
//! A proposal is a village's request for regional-assistance (bankeu) funding.
//! It carries one or more activity items and moves through verification stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw verification status as stored by the system of record.
///
/// `Rejected` and `Revision` are distinct raw values. They only collapse into
/// one bucket at filter/aggregation time (see [`StatusBucket`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Submitted, not yet picked up by a verifier
    Pending,
    /// A verifier has opened the proposal for review
    InReview,
    /// Approved by the acting verifier
    Approved,
    /// Sent back to the village for rework
    Revision,
    /// Legacy alias of `Revision`
    Rejected,
}

impl Default for ProposalStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl ProposalStatus {
    /// Every raw status, in display order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InReview,
        Self::Approved,
        Self::Revision,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Revision => "revision",
            Self::Rejected => "rejected",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "in_review" | "in-review" | "review" => Some(Self::InReview),
            "approved" => Some(Self::Approved),
            "revision" => Some(Self::Revision),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Presentation bucket this raw status is counted under.
    pub fn bucket(&self) -> StatusBucket {
        match self {
            Self::Pending => StatusBucket::Pending,
            Self::InReview => StatusBucket::InReview,
            Self::Approved => StatusBucket::Approved,
            Self::Revision | Self::Rejected => StatusBucket::Revision,
        }
    }

    /// Whether a verifier may still act on a proposal in this status.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending | Self::InReview)
    }

    /// No transition out of this status is performed by the verification core.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display/counting bucket. `rejected` and `revision` share one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Pending,
    InReview,
    Approved,
    Revision,
}

impl StatusBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Revision => "revision",
        }
    }
}

/// Kind of activity funded by a proposal item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Infrastructure,
    NonInfrastructure,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::NonInfrastructure => "non_infrastructure",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "infrastructure" | "infrastruktur" => Some(Self::Infrastructure),
            "non_infrastructure" | "non-infrastructure" | "non_infrastruktur" => {
                Some(Self::NonInfrastructure)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One funded activity inside a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityItem {
    /// Item identifier, unique within the proposal
    pub id: String,
    /// Activity name as written by the village
    pub name: String,
    /// Infrastructure or non-infrastructure
    pub kind: ActivityKind,
    /// Planned volume (e.g. "250 m")
    #[serde(default)]
    pub volume: Option<String>,
    /// Where the activity takes place
    #[serde(default)]
    pub location: Option<String>,
    /// Requested budget in whole rupiah
    #[serde(default)]
    pub budget: u64,
}

impl ActivityItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            volume: None,
            location: None,
            budget: 0,
        }
    }

    pub fn with_budget(mut self, budget: u64) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Administrative region reference (village or district).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionRef {
    pub id: String,
    pub name: String,
}

impl RegionRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A funding proposal submitted by a village.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Unique identifier
    pub id: Uuid,
    /// Proposal title
    pub title: String,
    /// Fiscal year the proposal is submitted for
    pub year: i32,
    /// Owning village
    pub village: RegionRef,
    /// District the village belongs to
    pub district: RegionRef,
    /// Funded activities
    #[serde(default)]
    pub items: Vec<ActivityItem>,
    /// Current raw verification status
    #[serde(default)]
    pub status: ProposalStatus,
    /// Note attached to the latest decision
    #[serde(default)]
    pub note: Option<String>,
    /// When the latest verification action happened
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    /// Whether the proposal was forwarded to the next approval tier
    #[serde(default)]
    pub forwarded_to_next_tier: bool,
    /// Reference to the submitted document, if any
    #[serde(default)]
    pub document_ref: Option<String>,
    /// Request id of the last decision applied (for idempotent replays)
    #[serde(default)]
    pub last_decision_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Create a pending proposal for the given village.
    pub fn new(
        title: impl Into<String>,
        year: i32,
        village: RegionRef,
        district: RegionRef,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            year,
            village,
            district,
            items: Vec::new(),
            status: ProposalStatus::default(),
            note: None,
            verified_at: None,
            forwarded_to_next_tier: false,
            document_ref: None,
            last_decision_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an activity item.
    pub fn with_item(mut self, item: ActivityItem) -> Self {
        self.items.push(item);
        self
    }

    /// Set the raw status.
    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the submitted document reference.
    pub fn with_document(mut self, document_ref: impl Into<String>) -> Self {
        self.document_ref = Some(document_ref.into());
        self
    }

    /// Sum of all item budgets.
    pub fn total_budget(&self) -> u64 {
        self.items.iter().map(|i| i.budget).sum()
    }

    /// Whether any item is of the given kind.
    pub fn has_activity_kind(&self, kind: ActivityKind) -> bool {
        self.items.iter().any(|i| i.kind == kind)
    }

    /// Validate structural fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Proposal title cannot be empty".to_string());
        }
        if self.village.id.trim().is_empty() || self.district.id.trim().is_empty() {
            return Err("Proposal must belong to a village and a district".to_string());
        }
        Ok(())
    }
}

/// Institution the current listing is being verified for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingInstitution {
    pub id: String,
    pub name: String,
}

/// Result of `list_proposals`: the flat proposal set plus the acting institution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalListing {
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub institution: Option<ActingInstitution>,
}

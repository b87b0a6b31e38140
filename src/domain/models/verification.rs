//! Verification decisions and the history events they leave behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::actor::Role;
use super::proposal::ProposalStatus;

/// Action a verifier can take on a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationAction {
    /// Endorse the proposal
    Approve,
    /// Send the proposal back for rework; requires a note
    Reject,
}

impl VerificationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Status the proposal lands in when this action succeeds.
    pub fn target_status(&self) -> ProposalStatus {
        match self {
            Self::Approve => ProposalStatus::Approved,
            Self::Reject => ProposalStatus::Revision,
        }
    }

    /// Action name used by the repository's `submit_decision` call.
    pub fn wire_action(&self) -> DecisionAction {
        match self {
            Self::Approve => DecisionAction::Approved,
            Self::Reject => DecisionAction::Revision,
        }
    }

    /// Whether this action needs a non-blank note.
    pub fn requires_note(&self) -> bool {
        matches!(self, Self::Reject)
    }

    /// Whether this action records an endorsement and so needs a signing identity.
    pub fn requires_eligibility(&self) -> bool {
        matches!(self, Self::Approve)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Some(Self::Approve),
            "reject" | "revision" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action as named in the repository's decision payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approved,
    Revision,
}

/// Who made a decision, as recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventActor {
    pub name: String,
    pub role: Role,
}

/// An append-only record of one verification decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Unique event id; stores deduplicate replays on it
    pub id: Uuid,
    /// Proposal this decision applies to
    pub proposal_id: Uuid,
    /// Action taken
    pub action: VerificationAction,
    /// Status before the decision
    pub old_status: ProposalStatus,
    /// Status after the decision
    pub new_status: ProposalStatus,
    /// Acting party
    pub actor: EventActor,
    /// When the decision was made
    pub recorded_at: DateTime<Utc>,
    /// Decision note, verbatim
    #[serde(default)]
    pub note: Option<String>,
    /// Document version in effect when the decision was made
    #[serde(default)]
    pub document_snapshot: Option<String>,
}

/// A decision the actor wants to make, before any check has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    pub proposal_id: Uuid,
    pub action: VerificationAction,
    #[serde(default)]
    pub note: Option<String>,
}

impl PendingAction {
    pub fn approve(proposal_id: Uuid) -> Self {
        Self {
            proposal_id,
            action: VerificationAction::Approve,
            note: None,
        }
    }

    pub fn reject(proposal_id: Uuid, note: impl Into<String>) -> Self {
        Self {
            proposal_id,
            action: VerificationAction::Reject,
            note: Some(note.into()),
        }
    }

    /// Attach (or replace) the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Note with surrounding whitespace removed, `None` when blank.
    pub fn trimmed_note(&self) -> Option<&str> {
        self.note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// Payload of the repository's single mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// Idempotency key; equal to the id of the event the decision produced
    pub request_id: Uuid,
    pub action: DecisionAction,
    /// Status the decision was checked against; the repository refuses the
    /// decision when the stored status has moved on
    pub expected_status: ProposalStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl DecisionRequest {
    pub fn from_event(event: &VerificationEvent) -> Self {
        Self {
            request_id: event.id,
            action: event.action.wire_action(),
            expected_status: event.old_status,
            note: event.note.clone(),
            decided_at: event.recorded_at,
        }
    }

    /// Raw status the repository stores for this decision.
    pub fn resulting_status(&self) -> ProposalStatus {
        match self.action {
            DecisionAction::Approved => ProposalStatus::Approved,
            DecisionAction::Revision => ProposalStatus::Revision,
        }
    }
}

//! Legal status transitions of a proposal under verification.
//!
//! The machine is synchronous and pure. It never touches the repository: a
//! refused action leaves no trace, an accepted one yields the new status and
//! exactly one [`VerificationEvent`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ActorContext, Capability, EventActor, PendingAction, Proposal, ProposalStatus,
    VerificationAction, VerificationEvent,
};

/// Accepted transition, ready to be submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: ProposalStatus,
    pub to: ProposalStatus,
    pub event: VerificationEvent,
}

/// Verification state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationStateMachine;

impl VerificationStateMachine {
    pub fn new() -> Self {
        Self
    }

    /// Actions this core may perform from a raw status.
    pub fn valid_actions(status: ProposalStatus) -> &'static [VerificationAction] {
        match status {
            ProposalStatus::Pending | ProposalStatus::InReview => {
                &[VerificationAction::Approve, VerificationAction::Reject]
            }
            ProposalStatus::Approved | ProposalStatus::Revision | ProposalStatus::Rejected => &[],
        }
    }

    pub fn can_perform(status: ProposalStatus, action: VerificationAction) -> bool {
        Self::valid_actions(status).contains(&action)
    }

    /// Refuse actors that may not act on proposals at all.
    pub fn authorize(actor: &ActorContext) -> DomainResult<()> {
        if actor.can(Capability::CanApprove) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(Capability::CanApprove))
        }
    }

    /// Validate `pending` against `proposal` and build the resulting transition.
    ///
    /// Legality is checked before the note, so a blank note on an approved
    /// proposal reports the illegal transition.
    pub fn apply(
        &self,
        proposal: &Proposal,
        pending: &PendingAction,
        actor: &ActorContext,
        now: DateTime<Utc>,
    ) -> DomainResult<Transition> {
        Self::authorize(actor)?;

        if pending.proposal_id != proposal.id {
            return Err(DomainError::validation(
                "proposal_id",
                format!(
                    "action targets {} but proposal is {}",
                    pending.proposal_id, proposal.id
                ),
            ));
        }

        let from = proposal.status;
        let to = pending.action.target_status();
        if !Self::can_perform(from, pending.action) {
            return Err(DomainError::IllegalTransition {
                from,
                to,
                requested: pending.action,
            });
        }

        let note = match pending.trimmed_note() {
            Some(_) => pending.note.clone(),
            None if pending.action.requires_note() => {
                return Err(DomainError::validation(
                    "note",
                    "a revision note is required and must not be blank",
                ));
            }
            None => None,
        };

        let event = VerificationEvent {
            id: Uuid::new_v4(),
            proposal_id: proposal.id,
            action: pending.action,
            old_status: from,
            new_status: to,
            actor: EventActor {
                name: actor.name.clone(),
                role: actor.role,
            },
            recorded_at: now,
            note,
            document_snapshot: proposal.document_ref.clone(),
        };

        Ok(Transition { from, to, event })
    }
}

//! Orchestrates a verification decision end to end.
//!
//! Order of checks for [`VerificationService::decide`]:
//! 1. per-proposal in-flight guard
//! 2. capability check
//! 3. proposal lookup
//! 4. eligibility gate (approve only)
//! 5. state machine
//! 6. one `submit_decision` call
//! 7. audit trail append
//!
//! Steps 1-5 are local; a failure there never reaches the repository.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ActorContext, Capability, DecisionRequest, EligibilityOutcome, EligibilitySource,
    PendingAction, Proposal, ProposalListing, StatusStatistics, VerificationEvent,
    VerifierEligibility,
};
use crate::domain::ports::{AuditTrailStore, ProposalRepository};
use crate::services::action_locks::ActionLocks;
use crate::services::audit_trail::AuditTrailRecorder;
use crate::services::eligibility_gate::EligibilityGate;
use crate::services::state_machine::VerificationStateMachine;

/// Result of a confirmed decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    /// Proposal as returned by the repository
    pub proposal: Proposal,
    /// History event produced by the decision
    pub event: VerificationEvent,
    /// False when the repository applied the decision but the history append failed
    pub history_recorded: bool,
}

pub struct VerificationService<R: ProposalRepository + ?Sized, S: AuditTrailStore + ?Sized> {
    repository: Arc<R>,
    audit: AuditTrailRecorder<S>,
    gate: EligibilityGate,
    machine: VerificationStateMachine,
    locks: ActionLocks,
}

impl<R: ProposalRepository + ?Sized, S: AuditTrailStore + ?Sized> VerificationService<R, S> {
    pub fn new(repository: Arc<R>, store: Arc<S>) -> Self {
        Self {
            repository,
            audit: AuditTrailRecorder::new(store),
            gate: EligibilityGate::new(),
            machine: VerificationStateMachine::new(),
            locks: ActionLocks::new(),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn audit_trail(&self) -> &AuditTrailRecorder<S> {
        &self.audit
    }

    /// Whether a decision for `proposal_id` is currently in flight.
    pub fn is_in_flight(&self, proposal_id: Uuid) -> bool {
        self.locks.is_in_flight(proposal_id)
    }

    pub async fn list(&self, year: i32) -> DomainResult<ProposalListing> {
        Ok(self.repository.list_proposals(year).await?)
    }

    pub async fn statistics(&self, year: i32) -> DomainResult<StatusStatistics> {
        Ok(self.repository.list_statistics(year).await?)
    }

    pub async fn get(&self, proposal_id: Uuid) -> DomainResult<Proposal> {
        self.repository
            .get_proposal(proposal_id)
            .await?
            .ok_or(DomainError::ProposalNotFound(proposal_id))
    }

    /// Fetch the setup record the eligibility gate evaluates for `actor`.
    pub async fn eligibility_for(&self, actor: &ActorContext) -> DomainResult<VerifierEligibility> {
        Ok(match &actor.eligibility_source {
            EligibilitySource::Individual => {
                VerifierEligibility::Individual(self.repository.verifier_profile(&actor.id).await?)
            }
            EligibilitySource::Institutional { institution_id } => {
                VerifierEligibility::Institutional {
                    institution_id: institution_id.clone(),
                    config: self.repository.institution_config(institution_id).await?,
                }
            }
        })
    }

    /// Evaluate the eligibility gate for `actor` without acting on anything.
    pub async fn check_eligibility(
        &self,
        actor: &ActorContext,
    ) -> DomainResult<EligibilityOutcome> {
        let eligibility = self.eligibility_for(actor).await?;
        Ok(self.gate.check(&eligibility))
    }

    /// Decision history of a proposal, oldest first.
    pub async fn history(
        &self,
        actor: &ActorContext,
        proposal_id: Uuid,
    ) -> DomainResult<Vec<VerificationEvent>> {
        if !actor.can(Capability::CanViewHistory) {
            return Err(DomainError::Forbidden(Capability::CanViewHistory));
        }
        self.audit.history(proposal_id).await
    }

    /// Run a pending action through the gate and state machine and submit it.
    ///
    /// Once the repository confirms the decision the call returns `Ok`, even
    /// when the history append fails. In that case `history_recorded` is false
    /// and the transition has no event until `outcome.event` is passed to
    /// [`record_history`](Self::record_history).
    pub async fn decide(
        &self,
        actor: &ActorContext,
        pending: &PendingAction,
    ) -> DomainResult<DecisionOutcome> {
        let proposal_id = pending.proposal_id;
        let _guard = self.locks.acquire(proposal_id).inspect_err(|_| {
            tracing::warn!(proposal_id = %proposal_id, "action already in flight");
        })?;

        let result = self.decide_locked(actor, pending).await;
        match &result {
            Ok(outcome) => tracing::info!(
                proposal_id = %proposal_id,
                action = %pending.action,
                actor = %actor.name,
                new_status = %outcome.proposal.status,
                "decision recorded"
            ),
            Err(err) if err.is_local() => tracing::warn!(
                proposal_id = %proposal_id,
                action = %pending.action,
                error = %err,
                "decision refused"
            ),
            Err(err) => tracing::error!(
                proposal_id = %proposal_id,
                action = %pending.action,
                error = %err,
                "decision failed at repository"
            ),
        }
        result
    }

    /// Append an already-applied decision event to the history.
    ///
    /// Stores keep one entry per event id, so re-appending an event that did
    /// land is a no-op.
    pub async fn record_history(&self, event: &VerificationEvent) -> DomainResult<()> {
        self.audit.record(event.proposal_id, event).await
    }

    async fn decide_locked(
        &self,
        actor: &ActorContext,
        pending: &PendingAction,
    ) -> DomainResult<DecisionOutcome> {
        VerificationStateMachine::authorize(actor)?;

        let proposal = self.get(pending.proposal_id).await?;

        if pending.action.requires_eligibility() {
            let eligibility = self.eligibility_for(actor).await?;
            self.gate.ensure(&eligibility)?;
        }

        let transition = self.machine.apply(&proposal, pending, actor, Utc::now())?;
        let request = DecisionRequest::from_event(&transition.event);

        let updated = self
            .repository
            .submit_decision(proposal.id, &request)
            .await?;

        let history_recorded = match self.audit.record(proposal.id, &transition.event).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    proposal_id = %proposal.id,
                    event_id = %transition.event.id,
                    error = %err,
                    "decision applied but history append failed"
                );
                false
            }
        };

        Ok(DecisionOutcome {
            proposal: updated,
            event: transition.event,
            history_recorded,
        })
    }
}

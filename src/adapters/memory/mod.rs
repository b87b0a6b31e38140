//! In-memory implementations of the repository ports.
//!
//! Used by tests and as the reference behaviour of the port contracts.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::models::{
    ActingInstitution, DecisionRequest, InstitutionConfig, Proposal, ProposalListing,
    StatusStatistics, VerificationEvent, VerifierProfile,
};
use crate::domain::ports::{AuditTrailStore, ProposalRepository, RepositoryError};

#[derive(Default)]
struct ProposalState {
    proposals: Vec<Proposal>,
    profiles: HashMap<String, VerifierProfile>,
    institutions: HashMap<String, InstitutionConfig>,
    applied: HashSet<Uuid>,
}

/// Proposal repository backed by a `Vec`, preserving insertion order.
#[derive(Default)]
pub struct InMemoryProposalRepository {
    state: RwLock<ProposalState>,
    institution: Option<ActingInstitution>,
    fail_next: Mutex<Option<RepositoryError>>,
    submits: AtomicUsize,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_institution(mut self, institution: ActingInstitution) -> Self {
        self.institution = Some(institution);
        self
    }

    /// Insert or replace a proposal.
    pub async fn insert(&self, proposal: Proposal) {
        let mut state = self.state.write().await;
        match state.proposals.iter_mut().find(|p| p.id == proposal.id) {
            Some(existing) => *existing = proposal,
            None => state.proposals.push(proposal),
        }
    }

    pub async fn set_verifier_profile(&self, actor_id: &str, profile: VerifierProfile) {
        self.state
            .write()
            .await
            .profiles
            .insert(actor_id.to_string(), profile);
    }

    pub async fn set_institution_config(&self, config: InstitutionConfig) {
        self.state
            .write()
            .await
            .institutions
            .insert(config.institution_id.clone(), config);
    }

    /// Make the next `submit_decision` fail with `error` without applying anything.
    pub fn fail_next_submit(&self, error: RepositoryError) {
        *self.fail_slot() = Some(error);
    }

    /// Number of `submit_decision` calls received, including failed ones.
    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    fn fail_slot(&self) -> std::sync::MutexGuard<'_, Option<RepositoryError>> {
        self.fail_next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn list_proposals(&self, year: i32) -> Result<ProposalListing, RepositoryError> {
        let state = self.state.read().await;
        Ok(ProposalListing {
            proposals: state
                .proposals
                .iter()
                .filter(|p| p.year == year)
                .cloned()
                .collect(),
            institution: self.institution.clone(),
        })
    }

    async fn list_statistics(&self, year: i32) -> Result<StatusStatistics, RepositoryError> {
        let state = self.state.read().await;
        Ok(StatusStatistics::from_proposals(
            state.proposals.iter().filter(|p| p.year == year),
        ))
    }

    async fn get_proposal(&self, id: Uuid) -> Result<Option<Proposal>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.proposals.iter().find(|p| p.id == id).cloned())
    }

    async fn submit_decision(
        &self,
        proposal_id: Uuid,
        request: &DecisionRequest,
    ) -> Result<Proposal, RepositoryError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_slot().take() {
            return Err(err);
        }

        let mut state = self.state.write().await;
        let replay = state.applied.contains(&request.request_id);
        let proposal = state
            .proposals
            .iter_mut()
            .find(|p| p.id == proposal_id)
            .ok_or(RepositoryError::NotFound(proposal_id))?;

        if !replay {
            if proposal.status != request.expected_status {
                return Err(RepositoryError::status_conflict(
                    request.expected_status,
                    proposal.status,
                ));
            }
            proposal.status = request.resulting_status();
            proposal.note = request.note.clone();
            proposal.verified_at = Some(request.decided_at);
            proposal.last_decision_id = Some(request.request_id);
            proposal.updated_at = Utc::now();
        }
        let updated = proposal.clone();
        state.applied.insert(request.request_id);
        Ok(updated)
    }

    async fn verifier_profile(
        &self,
        actor_id: &str,
    ) -> Result<Option<VerifierProfile>, RepositoryError> {
        Ok(self.state.read().await.profiles.get(actor_id).cloned())
    }

    async fn institution_config(
        &self,
        institution_id: &str,
    ) -> Result<Option<InstitutionConfig>, RepositoryError> {
        Ok(self.state.read().await.institutions.get(institution_id).cloned())
    }
}

/// Audit trail store keeping events in append order.
#[derive(Default)]
pub struct InMemoryAuditTrailStore {
    events: RwLock<Vec<VerificationEvent>>,
}

impl InMemoryAuditTrailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl AuditTrailStore for InMemoryAuditTrailStore {
    async fn append(&self, event: &VerificationEvent) -> Result<(), RepositoryError> {
        let mut events = self.events.write().await;
        if !events.iter().any(|e| e.id == event.id) {
            events.push(event.clone());
        }
        Ok(())
    }

    async fn events_for(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<VerificationEvent>, RepositoryError> {
        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.proposal_id == proposal_id)
            .cloned()
            .collect())
    }
}

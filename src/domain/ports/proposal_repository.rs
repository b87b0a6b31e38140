use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{
    DecisionRequest, InstitutionConfig, Proposal, ProposalListing, StatusStatistics,
    VerifierProfile,
};
use crate::domain::ports::errors::RepositoryError;

/// Repository port for the system of record that serves proposals.
///
/// `submit_decision` is the only mutating call. Implementations must treat a
/// replay of an already-applied `request_id` as a no-op returning the current
/// proposal.
#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// List all proposals of a fiscal year plus the acting institution
    async fn list_proposals(&self, year: i32) -> Result<ProposalListing, RepositoryError>;

    /// Raw per-status counts for a fiscal year
    async fn list_statistics(&self, year: i32) -> Result<StatusStatistics, RepositoryError>;

    /// Get a single proposal
    async fn get_proposal(&self, id: Uuid) -> Result<Option<Proposal>, RepositoryError>;

    /// Apply a verification decision and return the updated proposal
    async fn submit_decision(
        &self,
        proposal_id: Uuid,
        request: &DecisionRequest,
    ) -> Result<Proposal, RepositoryError>;

    /// Signing profile of the acting verifier, if one exists
    async fn verifier_profile(&self, actor_id: &str)
        -> Result<Option<VerifierProfile>, RepositoryError>;

    /// Delegate configuration of an institution, if one exists
    async fn institution_config(
        &self,
        institution_id: &str,
    ) -> Result<Option<InstitutionConfig>, RepositoryError>;
}

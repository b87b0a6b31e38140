//! Ports implemented against the backend REST API.

use async_trait::async_trait;
use uuid::Uuid;

use super::client::RestClient;
use crate::domain::models::{
    DecisionRequest, InstitutionConfig, Proposal, ProposalListing, StatusStatistics,
    VerificationEvent, VerifierProfile,
};
use crate::domain::ports::{AuditTrailStore, ProposalRepository, RepositoryError};

/// `ProposalRepository` served by the REST backend.
#[derive(Debug, Clone)]
pub struct RestProposalRepository {
    client: RestClient,
}

impl RestProposalRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProposalRepository for RestProposalRepository {
    async fn list_proposals(&self, year: i32) -> Result<ProposalListing, RepositoryError> {
        self.client
            .get_json("/proposals", &[("year", year.to_string())])
            .await
    }

    async fn list_statistics(&self, year: i32) -> Result<StatusStatistics, RepositoryError> {
        self.client
            .get_json("/proposals/statistics", &[("year", year.to_string())])
            .await
    }

    async fn get_proposal(&self, id: Uuid) -> Result<Option<Proposal>, RepositoryError> {
        self.client
            .get_optional_json(&format!("/proposals/{id}"), &[])
            .await
    }

    async fn submit_decision(
        &self,
        proposal_id: Uuid,
        request: &DecisionRequest,
    ) -> Result<Proposal, RepositoryError> {
        let path = format!("/proposals/{proposal_id}/decision");
        match self.client.post_json(&path, request).await {
            Err(RepositoryError::Rejected { status: 404, .. }) => {
                Err(RepositoryError::NotFound(proposal_id))
            }
            other => other,
        }
    }

    async fn verifier_profile(
        &self,
        actor_id: &str,
    ) -> Result<Option<VerifierProfile>, RepositoryError> {
        self.client
            .get_optional_json("/verifier/profile", &[("actor_id", actor_id.to_string())])
            .await
    }

    async fn institution_config(
        &self,
        institution_id: &str,
    ) -> Result<Option<InstitutionConfig>, RepositoryError> {
        let config: Option<InstitutionConfig> = self
            .client
            .get_optional_json(&format!("/institutions/{institution_id}/config"), &[])
            .await?;
        Ok(config.map(|mut c| {
            if c.institution_id.is_empty() {
                c.institution_id = institution_id.to_string();
            }
            c
        }))
    }
}

/// `AuditTrailStore` served by the REST backend's history endpoints.
#[derive(Debug, Clone)]
pub struct RestAuditTrailStore {
    client: RestClient,
}

impl RestAuditTrailStore {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuditTrailStore for RestAuditTrailStore {
    async fn append(&self, event: &VerificationEvent) -> Result<(), RepositoryError> {
        let path = format!("/proposals/{}/history", event.proposal_id);
        match self.client.post_unit(&path, event).await {
            // The backend answers 409 for an event id it already holds
            Err(RepositoryError::Rejected { status: 409, .. }) => Ok(()),
            other => other,
        }
    }

    async fn events_for(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<VerificationEvent>, RepositoryError> {
        self.client
            .get_json(&format!("/proposals/{proposal_id}/history"), &[])
            .await
    }
}

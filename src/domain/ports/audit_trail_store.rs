use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::VerificationEvent;
use crate::domain::ports::errors::RepositoryError;

/// Append-only backing store for verification history.
#[async_trait]
pub trait AuditTrailStore: Send + Sync {
    /// Append an event. Appending an event id that is already stored is a no-op.
    async fn append(&self, event: &VerificationEvent) -> Result<(), RepositoryError>;

    /// All events of a proposal, oldest first, in the order they were appended
    async fn events_for(&self, proposal_id: Uuid)
        -> Result<Vec<VerificationEvent>, RepositoryError>;
}

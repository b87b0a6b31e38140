use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::ProposalStatus;

/// Failures reported by a repository or audit-trail store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Proposal not found: {0}")]
    NotFound(Uuid),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// The stored status no longer matches the status a decision was checked against.
    pub fn status_conflict(expected: ProposalStatus, actual: ProposalStatus) -> Self {
        Self::Rejected {
            status: 409,
            message: format!(
                "proposal is {actual}, decision expected {expected}; refresh before deciding again"
            ),
        }
    }

    /// Whether the actor may re-trigger the same action and expect a different result.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Database(_) => true,
            Self::Rejected { status, .. } => *status >= 500 || *status == 429,
            Self::NotFound(_) | Self::Serialization(_) => false,
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

//! Domain errors for the proposal verification workflow.

use thiserror::Error;
use uuid::Uuid;

use super::models::eligibility::format_missing;
use super::models::{Capability, MissingField, ProposalStatus, SetupArea, VerificationAction};
use super::ports::errors::RepositoryError;

/// Errors raised while verifying proposals.
///
/// Every variant except `Repository` is produced locally, before the
/// repository is contacted.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error(
        "Approval requires a complete signing identity; missing {}. Complete the {setup_area}",
        format_missing(.missing)
    )]
    Eligibility {
        missing: Vec<MissingField>,
        setup_area: SetupArea,
    },

    #[error("Cannot {requested} a proposal in status {from}: no transition to {to}")]
    IllegalTransition {
        from: ProposalStatus,
        to: ProposalStatus,
        requested: VerificationAction,
    },

    #[error("Actor lacks capability {0}")]
    Forbidden(Capability),

    #[error("Proposal not found: {0}")]
    ProposalNotFound(Uuid),

    #[error("An action for proposal {0} is already in flight")]
    ActionInFlight(Uuid),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a validation error on a named field.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the failure happened locally, without contacting the repository.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility_message_names_area() {
        let err = DomainError::Eligibility {
            missing: vec![MissingField::NameTitle, MissingField::Signature],
            setup_area: SetupArea::InstitutionConfiguration {
                institution_id: "dpmd".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("name/title, signature"));
        assert!(msg.contains("institution configuration (dpmd)"));
        assert!(err.is_local());
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = DomainError::IllegalTransition {
            from: ProposalStatus::Approved,
            to: ProposalStatus::Revision,
            requested: VerificationAction::Reject,
        };
        assert_eq!(
            err.to_string(),
            "Cannot reject a proposal in status approved: no transition to revision"
        );
    }

    #[test]
    fn test_repository_error_is_remote() {
        let err: DomainError = RepositoryError::Unavailable("down".into()).into();
        assert!(!err.is_local());
    }
}

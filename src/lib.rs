//! Bankeu - verification workflow for regional-assistance funding proposals
//!
//! Villages submit funding proposals; verifiers approve them or send them
//! back for revision. This crate holds the verification core: the status
//! state machine, the eligibility gate checked before an approval, region
//! rollups and the append-only decision history.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the repository ports
//! - **Service Layer** (`services`): state machine, eligibility gate,
//!   filtering, aggregation, audit trail and the orchestrating service
//! - **Adapters** (`adapters`): SQLite, REST and in-memory port implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bankeu::adapters::memory::{InMemoryAuditTrailStore, InMemoryProposalRepository};
//! use bankeu::services::VerificationService;
//!
//! let service = VerificationService::new(
//!     Arc::new(InMemoryProposalRepository::new()),
//!     Arc::new(InMemoryAuditTrailStore::new()),
//! );
//! let outcome = service.decide(&actor, &PendingAction::approve(id)).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    ActorContext, Config, PendingAction, Proposal, ProposalQuery, ProposalStatus, RegionGroup,
    VerificationAction, VerificationEvent,
};
pub use domain::ports::{AuditTrailStore, ProposalRepository, RepositoryError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{DecisionOutcome, VerificationConsole, VerificationService};

//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - ProposalRepository: the system of record serving proposals and setup records
//! - AuditTrailStore: append-only storage of verification decisions
//!
//! These traits keep the verification core independent of SQLite, HTTP or
//! in-memory implementations.

pub mod audit_trail_store;
pub mod errors;
pub mod proposal_repository;

pub use audit_trail_store::AuditTrailStore;
pub use errors::RepositoryError;
pub use proposal_repository::ProposalRepository;

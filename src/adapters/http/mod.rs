//! REST adapters for a remote proposal backend.

pub mod client;
pub mod repository;

pub use client::RestClient;
pub use repository::{RestAuditTrailStore, RestProposalRepository};

//! Common test utilities for integration tests
//!
//! Shared fixtures for proposals, actors and in-memory services.

#![allow(dead_code)]

use std::sync::Arc;

use bankeu::adapters::memory::{InMemoryAuditTrailStore, InMemoryProposalRepository};
use bankeu::domain::models::{
    ActivityItem, ActivityKind, ActorContext, ActorIdentity, InstitutionConfig, Proposal,
    ProposalStatus, RegionRef, Role, VerifierProfile,
};
use bankeu::services::{CapabilityResolver, VerificationService};

pub type MemoryService = VerificationService<InMemoryProposalRepository, InMemoryAuditTrailStore>;

/// Service plus handles on its adapters for assertions.
pub struct Fixture {
    pub service: Arc<MemoryService>,
    pub repo: Arc<InMemoryProposalRepository>,
    pub store: Arc<InMemoryAuditTrailStore>,
}

pub fn fixture() -> Fixture {
    let repo = Arc::new(InMemoryProposalRepository::new());
    let store = Arc::new(InMemoryAuditTrailStore::new());
    Fixture {
        service: Arc::new(VerificationService::new(Arc::clone(&repo), Arc::clone(&store))),
        repo,
        store,
    }
}

pub fn proposal(
    title: &str,
    village: (&str, &str),
    district: (&str, &str),
    status: ProposalStatus,
) -> Proposal {
    Proposal::new(
        title,
        2025,
        RegionRef::new(village.0, village.1),
        RegionRef::new(district.0, district.1),
    )
    .with_status(status)
}

/// "Jalan Desa" in Cibinong, Cisarua with one infrastructure item.
pub fn jalan_desa() -> Proposal {
    proposal(
        "Jalan Desa",
        ("v-cibinong", "Cibinong"),
        ("d-cisarua", "Cisarua"),
        ProposalStatus::Pending,
    )
    .with_item(
        ActivityItem::new("i1", "Pengerasan jalan", ActivityKind::Infrastructure)
            .with_budget(150_000_000),
    )
    .with_document("proposal/2025/jalan-desa.pdf")
}

pub fn verifier() -> ActorContext {
    actor("u-verifier", "Ibu Sari", Role::Verifier, None)
}

pub fn delegate(institution_id: &str) -> ActorContext {
    actor("u-delegate", "Pak Dedi", Role::InstitutionDelegate, Some(institution_id))
}

pub fn village_user() -> ActorContext {
    actor("u-village", "Kades Tugu", Role::Village, None)
}

pub fn actor(id: &str, name: &str, role: Role, institution_id: Option<&str>) -> ActorContext {
    CapabilityResolver::resolve(&ActorIdentity {
        id: id.to_string(),
        name: name.to_string(),
        role,
        institution_id: institution_id.map(str::to_string),
    })
    .expect("valid test actor")
}

pub fn complete_profile() -> VerifierProfile {
    VerifierProfile {
        name: Some("Sari Wulandari".to_string()),
        title: Some("Kepala Seksi".to_string()),
        signature_ref: Some("signatures/sari.png".to_string()),
    }
}

pub fn complete_institution(institution_id: &str) -> InstitutionConfig {
    InstitutionConfig {
        institution_id: institution_id.to_string(),
        delegate_name: Some("Dedi Kurnia".to_string()),
        delegate_title: Some("Kepala Dinas".to_string()),
        signature_ref: Some("signatures/dedi.png".to_string()),
    }
}

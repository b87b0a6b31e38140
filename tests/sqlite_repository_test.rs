//! End-to-end decisions against a file-backed SQLite database.

mod common;

use std::sync::Arc;

use bankeu::adapters::sqlite::{
    initialize_database, SqliteAuditTrailStore, SqliteProposalRepository,
};
use bankeu::domain::models::{
    ActingInstitution, PendingAction, ProposalQuery, ProposalStatus, StatusFilter,
    VerificationAction,
};
use bankeu::domain::ports::ProposalRepository;
use bankeu::services::{VerificationConsole, VerificationService};

use common::{complete_institution, complete_profile, delegate, jalan_desa, proposal, verifier};

type SqliteService = VerificationService<SqliteProposalRepository, SqliteAuditTrailStore>;

async fn open(dir: &tempfile::TempDir) -> (Arc<SqliteService>, Arc<SqliteProposalRepository>) {
    let url = format!("sqlite:{}", dir.path().join("bankeu.db").display());
    let pool = initialize_database(&url, None).await.unwrap();
    let repo = Arc::new(
        SqliteProposalRepository::new(pool.clone()).with_institution(ActingInstitution {
            id: "dpmd".to_string(),
            name: "Dinas PMD".to_string(),
        }),
    );
    let store = Arc::new(SqliteAuditTrailStore::new(pool));
    (Arc::new(VerificationService::new(Arc::clone(&repo), store)), repo)
}

#[tokio::test]
async fn test_decisions_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let actor = verifier();
    let approved = jalan_desa();
    let revised = proposal(
        "Drainase",
        ("v-tugu", "Tugu"),
        ("d-cisarua", "Cisarua"),
        ProposalStatus::InReview,
    );

    {
        let (service, repo) = open(&dir).await;
        repo.insert_proposal(&approved).await.unwrap();
        repo.insert_proposal(&revised).await.unwrap();
        repo.upsert_verifier_profile(&actor.id, &complete_profile()).await.unwrap();

        service.decide(&actor, &PendingAction::approve(approved.id)).await.unwrap();
        service
            .decide(&actor, &PendingAction::reject(revised.id, "Lampirkan foto lokasi"))
            .await
            .unwrap();
    }

    let (service, repo) = open(&dir).await;
    let stored = repo.get_proposal(approved.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProposalStatus::Approved);
    assert!(stored.verified_at.is_some());

    let stored = repo.get_proposal(revised.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProposalStatus::Revision);
    assert_eq!(stored.note.as_deref(), Some("Lampirkan foto lokasi"));

    let history = service.history(&actor, revised.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, VerificationAction::Reject);
    assert_eq!(history[0].old_status, ProposalStatus::InReview);

    let stats = repo.list_statistics(2025).await.unwrap();
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.revision, 1);
    assert_eq!(stats.total(), 2);
}

#[tokio::test]
async fn test_delegate_approves_with_stored_institution_config() {
    let dir = tempfile::tempdir().unwrap();
    let (service, repo) = open(&dir).await;
    let actor = delegate("dpmd");
    let p = jalan_desa();
    repo.insert_proposal(&p).await.unwrap();

    assert!(!service.check_eligibility(&actor).await.unwrap().is_eligible());

    repo.upsert_institution_config(&complete_institution("dpmd")).await.unwrap();
    assert!(service.check_eligibility(&actor).await.unwrap().is_eligible());

    let outcome = service.decide(&actor, &PendingAction::approve(p.id)).await.unwrap();
    assert_eq!(outcome.proposal.status, ProposalStatus::Approved);
    assert_eq!(outcome.event.actor.name, "Pak Dedi");
}

#[tokio::test]
async fn test_console_over_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let (service, repo) = open(&dir).await;
    let cisarua = ("d-cisarua", "Cisarua");
    for p in [
        proposal("Jalan Desa", ("v-cibinong", "Cibinong"), cisarua, ProposalStatus::Pending),
        proposal("Drainase", ("v-tugu", "Tugu"), cisarua, ProposalStatus::Rejected),
        proposal(
            "Posyandu",
            ("v-bojong", "Bojong"),
            ("d-megamendung", "Megamendung"),
            ProposalStatus::Approved,
        ),
    ] {
        repo.insert_proposal(&p).await.unwrap();
    }

    let console = VerificationConsole::new(service, verifier());
    console.refresh(2025).await.unwrap();

    let view = console.view(&ProposalQuery::new()).await;
    assert_eq!(view.total, 3);
    assert_eq!(view.institution.as_ref().map(|i| i.id.as_str()), Some("dpmd"));
    let districts: Vec<_> = view.groups.iter().map(|g| g.district.name.as_str()).collect();
    assert_eq!(districts, vec!["Cisarua", "Megamendung"]);

    let revision = console
        .view(&ProposalQuery::new().with_status(StatusFilter::Status(ProposalStatus::Revision)))
        .await;
    assert_eq!(revision.matched, 1);
    assert_eq!(revision.groups[0].villages[0].village.name, "Tugu");

    let pending_id = view.groups[0].villages[0].proposals[0].id;
    console
        .submit(&PendingAction::reject(pending_id, "Perbaiki RAB"))
        .await
        .unwrap();
    let after = console.view(&ProposalQuery::new()).await;
    assert_eq!(after.rollup.revision, 2);
    assert_eq!(after.rollup.pending, 0);
}

//! REST adapters against a mock backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use bankeu::adapters::http::{RestAuditTrailStore, RestClient, RestProposalRepository};
use bankeu::domain::errors::DomainError;
use bankeu::domain::models::{
    ActingInstitution, PendingAction, ProposalListing, ProposalStatus, StatusStatistics,
};
use bankeu::domain::ports::{AuditTrailStore, ProposalRepository, RepositoryError};
use bankeu::services::VerificationService;
use mockito::{Matcher, Server};
use serde_json::json;
use uuid::Uuid;

use common::{complete_profile, jalan_desa, verifier};

fn client(server: &Server) -> RestClient {
    RestClient::new(server.url(), Some("secret-token".to_string()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_list_proposals_sends_year_and_token() {
    let mut server = Server::new_async().await;
    let listing = ProposalListing {
        proposals: vec![jalan_desa()],
        institution: Some(ActingInstitution {
            id: "dpmd".to_string(),
            name: "Dinas PMD".to_string(),
        }),
    };
    let mock = server
        .mock("GET", "/proposals")
        .match_query(Matcher::UrlEncoded("year".into(), "2025".into()))
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::to_string(&listing).unwrap())
        .create_async()
        .await;

    let repo = RestProposalRepository::new(client(&server));
    let fetched = repo.list_proposals(2025).await.unwrap();

    mock.assert_async().await;
    assert_eq!(fetched, listing);
}

#[tokio::test]
async fn test_statistics_keep_raw_statuses() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/proposals/statistics")
        .match_query(Matcher::UrlEncoded("year".into(), "2025".into()))
        .with_status(200)
        .with_body(r#"{"pending":3,"in_review":1,"approved":4,"rejected":2,"revision":1}"#)
        .create_async()
        .await;

    let repo = RestProposalRepository::new(client(&server));
    let stats = repo.list_statistics(2025).await.unwrap();
    assert_eq!(
        stats,
        StatusStatistics {
            pending: 3,
            in_review: 1,
            approved: 4,
            rejected: 2,
            revision: 1,
        }
    );
    assert_eq!(stats.to_rollup().revision, 3);
}

#[tokio::test]
async fn test_missing_records_map_to_none() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();
    let _proposal = server
        .mock("GET", format!("/proposals/{id}").as_str())
        .with_status(404)
        .create_async()
        .await;
    let _profile = server
        .mock("GET", "/verifier/profile")
        .match_query(Matcher::UrlEncoded("actor_id".into(), "u-verifier".into()))
        .with_status(404)
        .create_async()
        .await;
    let _institution = server
        .mock("GET", "/institutions/dpmd/config")
        .with_status(200)
        .with_body(r#"{"delegate_name":"Dedi Kurnia"}"#)
        .create_async()
        .await;

    let repo = RestProposalRepository::new(client(&server));
    assert!(repo.get_proposal(id).await.unwrap().is_none());
    assert!(repo.verifier_profile("u-verifier").await.unwrap().is_none());

    let config = repo.institution_config("dpmd").await.unwrap().unwrap();
    assert_eq!(config.institution_id, "dpmd");
    assert_eq!(config.delegate_name.as_deref(), Some("Dedi Kurnia"));
    assert!(config.signature_ref.is_none());
}

#[tokio::test]
async fn test_decision_round_trip_through_service() {
    let mut server = Server::new_async().await;
    let proposal = jalan_desa();
    let id = proposal.id;
    let mut updated = proposal.clone();
    updated.status = ProposalStatus::Revision;
    updated.note = Some("Perbaiki RAB".to_string());

    let _get = server
        .mock("GET", format!("/proposals/{id}").as_str())
        .with_status(200)
        .with_body(serde_json::to_string(&proposal).unwrap())
        .create_async()
        .await;
    let decision = server
        .mock("POST", format!("/proposals/{id}/decision").as_str())
        .match_body(Matcher::PartialJson(json!({
            "action": "revision",
            "expected_status": "pending",
            "note": "Perbaiki RAB",
        })))
        .with_status(200)
        .with_body(serde_json::to_string(&updated).unwrap())
        .expect(1)
        .create_async()
        .await;
    let history = server
        .mock("POST", format!("/proposals/{id}/history").as_str())
        .match_body(Matcher::PartialJson(json!({
            "action": "reject",
            "old_status": "pending",
            "new_status": "revision",
        })))
        .with_status(201)
        .expect(1)
        .create_async()
        .await;

    let rest = client(&server);
    let service = VerificationService::new(
        Arc::new(RestProposalRepository::new(rest.clone())),
        Arc::new(RestAuditTrailStore::new(rest)),
    );
    let outcome = service
        .decide(&verifier(), &PendingAction::reject(id, "Perbaiki RAB"))
        .await
        .unwrap();

    decision.assert_async().await;
    history.assert_async().await;
    assert_eq!(outcome.proposal.status, ProposalStatus::Revision);
    assert!(outcome.history_recorded);
}

#[tokio::test]
async fn test_approval_blocked_before_any_post() {
    let mut server = Server::new_async().await;
    let proposal = jalan_desa();
    let id = proposal.id;
    let mut profile = complete_profile();
    profile.signature_ref = None;

    let _get = server
        .mock("GET", format!("/proposals/{id}").as_str())
        .with_status(200)
        .with_body(serde_json::to_string(&proposal).unwrap())
        .create_async()
        .await;
    let _profile = server
        .mock("GET", "/verifier/profile")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(serde_json::to_string(&profile).unwrap())
        .create_async()
        .await;
    let decision = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let rest = client(&server);
    let service = VerificationService::new(
        Arc::new(RestProposalRepository::new(rest.clone())),
        Arc::new(RestAuditTrailStore::new(rest)),
    );
    let err = service
        .decide(&verifier(), &PendingAction::approve(id))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Eligibility { .. }));
    decision.assert_async().await;
}

#[tokio::test]
async fn test_backend_errors_are_classified() {
    let mut server = Server::new_async().await;
    let id = Uuid::new_v4();
    let _missing = server
        .mock("POST", format!("/proposals/{id}/decision").as_str())
        .with_status(404)
        .create_async()
        .await;
    let other = Uuid::new_v4();
    let _invalid = server
        .mock("POST", format!("/proposals/{other}/decision").as_str())
        .with_status(422)
        .with_body(r#"{"message":"Catatan wajib diisi"}"#)
        .create_async()
        .await;
    let decided = Uuid::new_v4();
    let _stale = server
        .mock("POST", format!("/proposals/{decided}/decision").as_str())
        .match_body(Matcher::PartialJson(json!({ "expected_status": "pending" })))
        .with_status(409)
        .with_body(r#"{"message":"Usulan sudah disetujui"}"#)
        .create_async()
        .await;

    let repo = RestProposalRepository::new(client(&server));
    let request = bankeu::domain::models::DecisionRequest {
        request_id: Uuid::new_v4(),
        action: bankeu::domain::models::DecisionAction::Revision,
        expected_status: ProposalStatus::Pending,
        note: Some("x".to_string()),
        decided_at: chrono::Utc::now(),
    };

    let err = repo.submit_decision(id, &request).await.unwrap_err();
    assert_eq!(err, RepositoryError::NotFound(id));

    let err = repo.submit_decision(other, &request).await.unwrap_err();
    assert_eq!(
        err,
        RepositoryError::Rejected {
            status: 422,
            message: "Catatan wajib diisi".to_string(),
        }
    );
    assert!(!err.is_retryable());

    let err = repo.submit_decision(decided, &request).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Rejected { status: 409, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_history_conflict_counts_as_recorded() {
    let mut server = Server::new_async().await;
    let proposal = jalan_desa();
    let _conflict = server
        .mock("POST", format!("/proposals/{}/history", proposal.id).as_str())
        .with_status(409)
        .create_async()
        .await;

    let store = RestAuditTrailStore::new(client(&server));
    let event = bankeu::domain::models::VerificationEvent {
        id: Uuid::new_v4(),
        proposal_id: proposal.id,
        action: bankeu::domain::models::VerificationAction::Approve,
        old_status: ProposalStatus::Pending,
        new_status: ProposalStatus::Approved,
        actor: bankeu::domain::models::EventActor {
            name: "Ibu Sari".to_string(),
            role: bankeu::domain::models::Role::Verifier,
        },
        recorded_at: chrono::Utc::now(),
        note: None,
        document_snapshot: None,
    };
    store.append(&event).await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_retryable() {
    // Nothing listens on port 9 in the test environment
    let rest = RestClient::new("http://127.0.0.1:9", None, Duration::from_millis(500)).unwrap();
    let err = RestProposalRepository::new(rest)
        .list_proposals(2025)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Unavailable(_)));
    assert!(err.is_retryable());
}

//! SQLite implementation of the ProposalRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{
    parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid,
};
use crate::domain::models::{
    ActingInstitution, ActivityItem, DecisionRequest, InstitutionConfig, Proposal,
    ProposalListing, ProposalStatus, RegionRef, StatusStatistics, VerifierProfile,
};
use crate::domain::ports::{ProposalRepository, RepositoryError};

#[derive(Clone)]
pub struct SqliteProposalRepository {
    pool: SqlitePool,
    institution: Option<ActingInstitution>,
}

impl SqliteProposalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            institution: None,
        }
    }

    /// Institution reported alongside every listing.
    pub fn with_institution(mut self, institution: ActingInstitution) -> Self {
        self.institution = Some(institution);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new proposal. An existing proposal with the same id is left
    /// untouched; returns whether a row was inserted.
    ///
    /// Verification fields only ever change through `submit_decision`.
    pub async fn insert_proposal(&self, proposal: &Proposal) -> Result<bool, RepositoryError> {
        proposal
            .validate()
            .map_err(|reason| RepositoryError::Rejected { status: 422, message: reason })?;
        let items_json = serde_json::to_string(&proposal.items)?;

        let result = sqlx::query(
            r#"INSERT INTO proposals (id, title, year, village_id, village_name, district_id,
               district_name, items, status, note, verified_at, forwarded_to_next_tier,
               document_ref, last_decision_id, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO NOTHING"#,
        )
        .bind(proposal.id.to_string())
        .bind(&proposal.title)
        .bind(proposal.year)
        .bind(&proposal.village.id)
        .bind(&proposal.village.name)
        .bind(&proposal.district.id)
        .bind(&proposal.district.name)
        .bind(&items_json)
        .bind(proposal.status.as_str())
        .bind(&proposal.note)
        .bind(proposal.verified_at.map(|t| t.to_rfc3339()))
        .bind(proposal.forwarded_to_next_tier)
        .bind(&proposal.document_ref)
        .bind(proposal.last_decision_id.map(|id| id.to_string()))
        .bind(proposal.created_at.to_rfc3339())
        .bind(proposal.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn upsert_verifier_profile(
        &self,
        actor_id: &str,
        profile: &VerifierProfile,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO verifier_profiles (actor_id, name, title, signature_ref, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(actor_id) DO UPDATE SET
                 name = excluded.name, title = excluded.title,
                 signature_ref = excluded.signature_ref, updated_at = excluded.updated_at"#,
        )
        .bind(actor_id)
        .bind(&profile.name)
        .bind(&profile.title)
        .bind(&profile.signature_ref)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_institution_config(
        &self,
        config: &InstitutionConfig,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO institution_configs
               (institution_id, delegate_name, delegate_title, signature_ref, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(institution_id) DO UPDATE SET
                 delegate_name = excluded.delegate_name,
                 delegate_title = excluded.delegate_title,
                 signature_ref = excluded.signature_ref, updated_at = excluded.updated_at"#,
        )
        .bind(&config.institution_id)
        .bind(&config.delegate_name)
        .bind(&config.delegate_title)
        .bind(&config.signature_ref)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProposalRepository for SqliteProposalRepository {
    async fn list_proposals(&self, year: i32) -> Result<ProposalListing, RepositoryError> {
        let rows: Vec<ProposalRow> =
            sqlx::query_as("SELECT * FROM proposals WHERE year = ? ORDER BY created_at, id")
                .bind(year)
                .fetch_all(&self.pool)
                .await?;

        Ok(ProposalListing {
            proposals: rows.into_iter().map(Proposal::try_from).collect::<Result<_, _>>()?,
            institution: self.institution.clone(),
        })
    }

    async fn list_statistics(&self, year: i32) -> Result<StatusStatistics, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM proposals WHERE year = ? GROUP BY status")
                .bind(year)
                .fetch_all(&self.pool)
                .await?;

        let mut stats = StatusStatistics::default();
        for (status, count) in rows {
            let status = ProposalStatus::from_str(&status).ok_or_else(|| {
                RepositoryError::Serialization(format!("Invalid status: {status}"))
            })?;
            stats.increment(status, u64::try_from(count).unwrap_or(0));
        }
        Ok(stats)
    }

    async fn get_proposal(&self, id: Uuid) -> Result<Option<Proposal>, RepositoryError> {
        let row: Option<ProposalRow> = sqlx::query_as("SELECT * FROM proposals WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Proposal::try_from).transpose()
    }

    async fn submit_decision(
        &self,
        proposal_id: Uuid,
        request: &DecisionRequest,
    ) -> Result<Proposal, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<ProposalRow> = sqlx::query_as("SELECT * FROM proposals WHERE id = ?")
            .bind(proposal_id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let current = row
            .map(Proposal::try_from)
            .transpose()?
            .ok_or(RepositoryError::NotFound(proposal_id))?;

        if current.last_decision_id == Some(request.request_id) {
            tracing::debug!(
                proposal_id = %proposal_id,
                request_id = %request.request_id,
                "decision replay ignored"
            );
            tx.commit().await?;
            return Ok(current);
        }

        if current.status != request.expected_status {
            return Err(RepositoryError::status_conflict(
                request.expected_status,
                current.status,
            ));
        }

        let now = Utc::now();
        // Conditional on the status so a concurrent writer cannot be overwritten
        let result = sqlx::query(
            r#"UPDATE proposals SET status = ?, note = ?, verified_at = ?,
               last_decision_id = ?, updated_at = ? WHERE id = ? AND status = ?"#,
        )
        .bind(request.resulting_status().as_str())
        .bind(&request.note)
        .bind(request.decided_at.to_rfc3339())
        .bind(request.request_id.to_string())
        .bind(now.to_rfc3339())
        .bind(proposal_id.to_string())
        .bind(request.expected_status.as_str())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            let actual: Option<(String,)> =
                sqlx::query_as("SELECT status FROM proposals WHERE id = ?")
                    .bind(proposal_id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?;
            let actual = actual
                .and_then(|(status,)| ProposalStatus::from_str(&status))
                .ok_or(RepositoryError::NotFound(proposal_id))?;
            return Err(RepositoryError::status_conflict(request.expected_status, actual));
        }
        tx.commit().await?;

        Ok(Proposal {
            status: request.resulting_status(),
            note: request.note.clone(),
            verified_at: Some(request.decided_at),
            last_decision_id: Some(request.request_id),
            updated_at: now,
            ..current
        })
    }

    async fn verifier_profile(
        &self,
        actor_id: &str,
    ) -> Result<Option<VerifierProfile>, RepositoryError> {
        let row: Option<(Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT name, title, signature_ref FROM verifier_profiles WHERE actor_id = ?",
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, title, signature_ref)| VerifierProfile {
            name,
            title,
            signature_ref,
        }))
    }

    async fn institution_config(
        &self,
        institution_id: &str,
    ) -> Result<Option<InstitutionConfig>, RepositoryError> {
        let row: Option<(Option<String>, Option<String>, Option<String>)> = sqlx::query_as(
            r#"SELECT delegate_name, delegate_title, signature_ref
               FROM institution_configs WHERE institution_id = ?"#,
        )
        .bind(institution_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(delegate_name, delegate_title, signature_ref)| InstitutionConfig {
            institution_id: institution_id.to_string(),
            delegate_name,
            delegate_title,
            signature_ref,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct ProposalRow {
    id: String,
    title: String,
    year: i32,
    village_id: String,
    village_name: String,
    district_id: String,
    district_name: String,
    items: String,
    status: String,
    note: Option<String>,
    verified_at: Option<String>,
    forwarded_to_next_tier: bool,
    document_ref: Option<String>,
    last_decision_id: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = RepositoryError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        let status = ProposalStatus::from_str(&row.status).ok_or_else(|| {
            RepositoryError::Serialization(format!("Invalid status: {}", row.status))
        })?;
        let items: Vec<ActivityItem> = serde_json::from_str(&row.items)?;

        Ok(Proposal {
            id: parse_uuid(&row.id)?,
            title: row.title,
            year: row.year,
            village: RegionRef::new(row.village_id, row.village_name),
            district: RegionRef::new(row.district_id, row.district_name),
            items,
            status,
            note: row.note,
            verified_at: parse_optional_datetime(row.verified_at)?,
            forwarded_to_next_tier: row.forwarded_to_next_tier,
            document_ref: row.document_ref,
            last_decision_id: parse_optional_uuid(row.last_decision_id)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::{ActivityKind, DecisionAction};

    async fn setup_test_repo() -> SqliteProposalRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteProposalRepository::new(pool)
    }

    fn sample(year: i32) -> Proposal {
        Proposal::new(
            "Jalan Desa",
            year,
            RegionRef::new("3201012001", "Cibinong"),
            RegionRef::new("320101", "Cisarua"),
        )
        .with_item(
            ActivityItem::new("1", "Pengaspalan", ActivityKind::Infrastructure)
                .with_volume("250 m")
                .with_budget(150_000_000),
        )
        .with_document("2025/jalan-desa.pdf")
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = setup_test_repo().await;
        let p = sample(2025);
        repo.insert_proposal(&p).await.unwrap();

        let loaded = repo.get_proposal(p.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Jalan Desa");
        assert_eq!(loaded.items, p.items);
        assert_eq!(loaded.document_ref.as_deref(), Some("2025/jalan-desa.pdf"));
        assert_eq!(loaded.status, ProposalStatus::Pending);
    }

    #[tokio::test]
    async fn test_statistics_keep_rejected_and_revision_apart() {
        let repo = setup_test_repo().await;
        for status in [
            ProposalStatus::Rejected,
            ProposalStatus::Revision,
            ProposalStatus::Revision,
            ProposalStatus::Approved,
        ] {
            repo.insert_proposal(&sample(2025).with_status(status)).await.unwrap();
        }
        repo.insert_proposal(&sample(2024)).await.unwrap();

        let stats = repo.list_statistics(2025).await.unwrap();
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.revision, 2);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.total(), 4);
    }

    #[tokio::test]
    async fn test_submit_decision_is_idempotent() {
        let repo = setup_test_repo().await;
        let p = sample(2025);
        repo.insert_proposal(&p).await.unwrap();

        let request = DecisionRequest {
            request_id: Uuid::new_v4(),
            action: DecisionAction::Revision,
            expected_status: ProposalStatus::Pending,
            note: Some("Lengkapi foto 0%".to_string()),
            decided_at: Utc::now(),
        };
        let first = repo.submit_decision(p.id, &request).await.unwrap();
        let replay = repo.submit_decision(p.id, &request).await.unwrap();

        assert_eq!(first.status, ProposalStatus::Revision);
        assert_eq!(replay.status, ProposalStatus::Revision);
        assert_eq!(replay.note.as_deref(), Some("Lengkapi foto 0%"));
        assert_eq!(replay.last_decision_id, Some(request.request_id));
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_verification_state() {
        let repo = setup_test_repo().await;
        let p = sample(2025);
        assert!(repo.insert_proposal(&p).await.unwrap());

        let request = DecisionRequest {
            request_id: Uuid::new_v4(),
            action: DecisionAction::Approved,
            expected_status: ProposalStatus::Pending,
            note: None,
            decided_at: Utc::now(),
        };
        repo.submit_decision(p.id, &request).await.unwrap();

        // Importing the original pending record again is a no-op
        let mut renamed = p.clone();
        renamed.title = "Jalan Desa (revisi)".to_string();
        assert!(!repo.insert_proposal(&renamed).await.unwrap());

        let loaded = repo.get_proposal(p.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ProposalStatus::Approved);
        assert_eq!(loaded.title, "Jalan Desa");
        assert_eq!(loaded.last_decision_id, Some(request.request_id));
    }

    #[tokio::test]
    async fn test_stale_decision_is_refused() {
        let repo = setup_test_repo().await;
        let p = sample(2025);
        repo.insert_proposal(&p).await.unwrap();

        let approve = DecisionRequest {
            request_id: Uuid::new_v4(),
            action: DecisionAction::Approved,
            expected_status: ProposalStatus::Pending,
            note: None,
            decided_at: Utc::now(),
        };
        repo.submit_decision(p.id, &approve).await.unwrap();

        // Another process checked the proposal while it was still pending
        let stale = DecisionRequest {
            request_id: Uuid::new_v4(),
            action: DecisionAction::Revision,
            expected_status: ProposalStatus::Pending,
            note: Some("Perbaiki RAB".to_string()),
            decided_at: Utc::now(),
        };
        let err = repo.submit_decision(p.id, &stale).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Rejected { status: 409, .. }));
        assert!(!err.is_retryable());

        let loaded = repo.get_proposal(p.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ProposalStatus::Approved);
        assert_eq!(loaded.last_decision_id, Some(approve.request_id));
    }

    #[tokio::test]
    async fn test_submit_decision_unknown_proposal() {
        let repo = setup_test_repo().await;
        let missing = Uuid::new_v4();
        let request = DecisionRequest {
            request_id: Uuid::new_v4(),
            action: DecisionAction::Approved,
            expected_status: ProposalStatus::Pending,
            note: None,
            decided_at: Utc::now(),
        };
        assert_eq!(
            repo.submit_decision(missing, &request).await.unwrap_err(),
            RepositoryError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_setup_records() {
        let repo = setup_test_repo().await;
        assert!(repo.verifier_profile("v-1").await.unwrap().is_none());

        let profile = VerifierProfile {
            name: Some("Ujang".to_string()),
            title: None,
            signature_ref: Some("ttd.png".to_string()),
        };
        repo.upsert_verifier_profile("v-1", &profile).await.unwrap();
        assert_eq!(repo.verifier_profile("v-1").await.unwrap(), Some(profile));

        let config = InstitutionConfig {
            institution_id: "dpmd".to_string(),
            delegate_name: Some("Lilis".to_string()),
            delegate_title: Some("Kadis".to_string()),
            signature_ref: None,
        };
        repo.upsert_institution_config(&config).await.unwrap();
        assert_eq!(repo.institution_config("dpmd").await.unwrap(), Some(config));
        assert!(repo.institution_config("bappeda").await.unwrap().is_none());
    }
}

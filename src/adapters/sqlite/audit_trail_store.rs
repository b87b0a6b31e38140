//! SQLite implementation of the AuditTrailStore.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::models::{
    EventActor, ProposalStatus, Role, VerificationAction, VerificationEvent,
};
use crate::domain::ports::{AuditTrailStore, RepositoryError};

#[derive(Clone)]
pub struct SqliteAuditTrailStore {
    pool: SqlitePool,
}

impl SqliteAuditTrailStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditTrailStore for SqliteAuditTrailStore {
    async fn append(&self, event: &VerificationEvent) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"INSERT OR IGNORE INTO verification_events
               (id, proposal_id, action, old_status, new_status, actor_name, actor_role,
                recorded_at, note, document_snapshot)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(event.id.to_string())
        .bind(event.proposal_id.to_string())
        .bind(event.action.as_str())
        .bind(event.old_status.as_str())
        .bind(event.new_status.as_str())
        .bind(&event.actor.name)
        .bind(event.actor.role.as_str())
        .bind(event.recorded_at.to_rfc3339())
        .bind(&event.note)
        .bind(&event.document_snapshot)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(event_id = %event.id, "verification event already stored");
        }
        Ok(())
    }

    async fn events_for(
        &self,
        proposal_id: Uuid,
    ) -> Result<Vec<VerificationEvent>, RepositoryError> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"SELECT id, proposal_id, action, old_status, new_status, actor_name, actor_role,
               recorded_at, note, document_snapshot
               FROM verification_events WHERE proposal_id = ?
               ORDER BY recorded_at, seq"#,
        )
        .bind(proposal_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VerificationEvent::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: String,
    proposal_id: String,
    action: String,
    old_status: String,
    new_status: String,
    actor_name: String,
    actor_role: String,
    recorded_at: String,
    note: Option<String>,
    document_snapshot: Option<String>,
}

fn parse_status(value: &str) -> Result<ProposalStatus, RepositoryError> {
    ProposalStatus::from_str(value)
        .ok_or_else(|| RepositoryError::Serialization(format!("Invalid status: {value}")))
}

impl TryFrom<EventRow> for VerificationEvent {
    type Error = RepositoryError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let action = VerificationAction::from_str(&row.action).ok_or_else(|| {
            RepositoryError::Serialization(format!("Invalid action: {}", row.action))
        })?;
        let role = Role::from_str(&row.actor_role).ok_or_else(|| {
            RepositoryError::Serialization(format!("Invalid role: {}", row.actor_role))
        })?;

        Ok(VerificationEvent {
            id: parse_uuid(&row.id)?,
            proposal_id: parse_uuid(&row.proposal_id)?,
            action,
            old_status: parse_status(&row.old_status)?,
            new_status: parse_status(&row.new_status)?,
            actor: EventActor {
                name: row.actor_name,
                role,
            },
            recorded_at: parse_datetime(&row.recorded_at)?,
            note: row.note,
            document_snapshot: row.document_snapshot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::{TimeZone, Utc};

    fn event(proposal_id: Uuid, second: u32) -> VerificationEvent {
        VerificationEvent {
            id: Uuid::new_v4(),
            proposal_id,
            action: VerificationAction::Reject,
            old_status: ProposalStatus::Pending,
            new_status: ProposalStatus::Revision,
            actor: EventActor {
                name: "Ujang".to_string(),
                role: Role::InstitutionDelegate,
            },
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, second).unwrap(),
            note: Some("Perbaiki RAB".to_string()),
            document_snapshot: Some("2025/v1.pdf".to_string()),
        }
    }

    #[tokio::test]
    async fn test_events_come_back_oldest_first() {
        let store = SqliteAuditTrailStore::new(create_migrated_test_pool().await.unwrap());
        let id = Uuid::new_v4();
        let later = event(id, 30);
        let earlier = event(id, 10);
        store.append(&later).await.unwrap();
        store.append(&earlier).await.unwrap();
        store.append(&event(Uuid::new_v4(), 0)).await.unwrap();

        let events = store.events_for(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, earlier.id);
        assert_eq!(events[1], later);
    }

    #[tokio::test]
    async fn test_same_timestamp_keeps_append_order() {
        let store = SqliteAuditTrailStore::new(create_migrated_test_pool().await.unwrap());
        let id = Uuid::new_v4();
        let first = event(id, 5);
        let second = event(id, 5);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();

        let events = store.events_for(id).await.unwrap();
        assert_eq!(events[0].id, first.id);
        assert_eq!(events[1].id, second.id);
    }

    #[tokio::test]
    async fn test_duplicate_append_is_ignored() {
        let store = SqliteAuditTrailStore::new(create_migrated_test_pool().await.unwrap());
        let id = Uuid::new_v4();
        let e = event(id, 0);
        store.append(&e).await.unwrap();
        store.append(&e).await.unwrap();
        assert_eq!(store.events_for(id).await.unwrap().len(), 1);
    }
}

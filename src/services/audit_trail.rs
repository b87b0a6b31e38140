//! Append-only verification history.
//!
//! The backing [`AuditTrailStore`] is authoritative. A per-proposal cache
//! serves repeat reads and is dropped on every write, so a read after a
//! confirmed write always goes back to the store.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::VerificationEvent;
use crate::domain::ports::AuditTrailStore;

/// Records and retrieves the ordered decision history of proposals.
pub struct AuditTrailRecorder<S: AuditTrailStore + ?Sized> {
    store: Arc<S>,
    cache: Arc<RwLock<HashMap<Uuid, Vec<VerificationEvent>>>>,
}

impl<S: AuditTrailStore + ?Sized> Clone for AuditTrailRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: AuditTrailStore + ?Sized> AuditTrailRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Append `event` to the history of `proposal_id`.
    pub async fn record(&self, proposal_id: Uuid, event: &VerificationEvent) -> DomainResult<()> {
        if event.proposal_id != proposal_id {
            return Err(DomainError::validation(
                "event.proposal_id",
                format!("event belongs to {} not {}", event.proposal_id, proposal_id),
            ));
        }

        let appended = self.store.append(event).await;
        self.cache.write().await.remove(&proposal_id);
        appended?;

        tracing::debug!(
            proposal_id = %proposal_id,
            event_id = %event.id,
            action = %event.action,
            "recorded verification event"
        );
        Ok(())
    }

    /// History of a proposal, oldest first.
    pub async fn history(&self, proposal_id: Uuid) -> DomainResult<Vec<VerificationEvent>> {
        if let Some(events) = self.cache.read().await.get(&proposal_id) {
            return Ok(events.clone());
        }

        let events = self.store.events_for(proposal_id).await?;
        self.cache.write().await.insert(proposal_id, events.clone());
        Ok(events)
    }

    /// Drop cached history so the next read goes to the store.
    pub async fn invalidate(&self, proposal_id: Uuid) {
        self.cache.write().await.remove(&proposal_id);
    }

    /// Most recent decision, if any.
    pub async fn latest(&self, proposal_id: Uuid) -> DomainResult<Option<VerificationEvent>> {
        Ok(self.history(proposal_id).await?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAuditTrailStore;
    use crate::domain::models::{EventActor, ProposalStatus, Role, VerificationAction};
    use chrono::{Duration, Utc};

    fn event(proposal_id: Uuid, minutes: i64, action: VerificationAction) -> VerificationEvent {
        VerificationEvent {
            id: Uuid::new_v4(),
            proposal_id,
            action,
            old_status: ProposalStatus::Pending,
            new_status: action.target_status(),
            actor: EventActor {
                name: "Ujang".to_string(),
                role: Role::Verifier,
            },
            recorded_at: Utc::now() + Duration::minutes(minutes),
            note: None,
            document_snapshot: None,
        }
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let recorder = AuditTrailRecorder::new(Arc::new(InMemoryAuditTrailStore::new()));
        let id = Uuid::new_v4();
        let first = event(id, 0, VerificationAction::Reject);
        let second = event(id, 5, VerificationAction::Approve);

        recorder.record(id, &first).await.unwrap();
        recorder.record(id, &second).await.unwrap();

        let history = recorder.history(id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first.id);
        assert_eq!(recorder.latest(id).await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_record_after_cached_read_is_visible_last() {
        let recorder = AuditTrailRecorder::new(Arc::new(InMemoryAuditTrailStore::new()));
        let id = Uuid::new_v4();
        recorder.record(id, &event(id, 0, VerificationAction::Reject)).await.unwrap();
        assert_eq!(recorder.history(id).await.unwrap().len(), 1);

        let next = event(id, 1, VerificationAction::Approve);
        recorder.record(id, &next).await.unwrap();
        let history = recorder.history(id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().id, next.id);
    }

    #[tokio::test]
    async fn test_replayed_event_is_not_duplicated() {
        let recorder = AuditTrailRecorder::new(Arc::new(InMemoryAuditTrailStore::new()));
        let id = Uuid::new_v4();
        let e = event(id, 0, VerificationAction::Approve);
        recorder.record(id, &e).await.unwrap();
        recorder.history(id).await.unwrap();
        recorder.record(id, &e).await.unwrap();
        assert_eq!(recorder.history(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_rejects_foreign_event() {
        let recorder = AuditTrailRecorder::new(Arc::new(InMemoryAuditTrailStore::new()));
        let e = event(Uuid::new_v4(), 0, VerificationAction::Approve);
        assert!(recorder.record(Uuid::new_v4(), &e).await.is_err());
    }
}

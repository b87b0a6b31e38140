//! Verification console session.
//!
//! Owns the actor and the proposal snapshot of one working session. The
//! snapshot only changes on an explicit [`refresh`](VerificationConsole::refresh)
//! or when a confirmed decision is applied while the console is still open.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ActingInstitution, ActorContext, PendingAction, Proposal, ProposalQuery, RegionGroup, Rollup,
    StatusStatistics,
};
use crate::domain::ports::{AuditTrailStore, ProposalRepository};
use crate::services::filter_engine::FilterEngine;
use crate::services::hierarchy_aggregator::HierarchyAggregator;
use crate::services::verification_service::{DecisionOutcome, VerificationService};

/// Proposals and statistics as of the last refresh.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSnapshot {
    pub year: Option<i32>,
    pub proposals: Vec<Proposal>,
    pub institution: Option<ActingInstitution>,
    pub statistics: StatusStatistics,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Filtered and grouped projection of the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleView {
    pub query: ProposalQuery,
    pub institution: Option<ActingInstitution>,
    pub groups: Vec<RegionGroup>,
    pub rollup: Rollup,
    /// Proposals that passed the query
    pub matched: usize,
    /// Proposals in the snapshot
    pub total: usize,
}

pub struct VerificationConsole<R: ProposalRepository + ?Sized, S: AuditTrailStore + ?Sized> {
    service: Arc<VerificationService<R, S>>,
    actor: ActorContext,
    snapshot: RwLock<ConsoleSnapshot>,
    alive: AtomicBool,
    filter: FilterEngine,
    aggregator: HierarchyAggregator,
}

impl<R: ProposalRepository + ?Sized, S: AuditTrailStore + ?Sized> VerificationConsole<R, S> {
    pub fn new(service: Arc<VerificationService<R, S>>, actor: ActorContext) -> Self {
        Self {
            service,
            actor,
            snapshot: RwLock::new(ConsoleSnapshot::default()),
            alive: AtomicBool::new(true),
            filter: FilterEngine::new(),
            aggregator: HierarchyAggregator::new(),
        }
    }

    pub fn actor(&self) -> &ActorContext {
        &self.actor
    }

    pub fn service(&self) -> &Arc<VerificationService<R, S>> {
        &self.service
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Tear the console down. In-flight submits still complete but no longer
    /// touch the snapshot.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Re-fetch proposals and statistics for `year`.
    pub async fn refresh(&self, year: i32) -> DomainResult<()> {
        let listing = self.service.list(year).await?;
        let statistics = self.service.statistics(year).await?;

        if !self.is_alive() {
            tracing::debug!(year, "console closed; discarding refreshed listing");
            return Ok(());
        }

        let mut snapshot = self.snapshot.write().await;
        *snapshot = ConsoleSnapshot {
            year: Some(year),
            proposals: listing.proposals,
            institution: listing.institution,
            statistics,
            fetched_at: Some(Utc::now()),
        };
        tracing::debug!(year, proposals = snapshot.proposals.len(), "console refreshed");
        Ok(())
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Filter then aggregate the current snapshot.
    pub async fn view(&self, query: &ProposalQuery) -> ConsoleView {
        let snapshot = self.snapshot.read().await;
        let filtered = self.filter.apply(&snapshot.proposals, query);
        let groups = self.aggregator.aggregate(&filtered);
        ConsoleView {
            query: query.clone(),
            institution: snapshot.institution.clone(),
            rollup: HierarchyAggregator::global_rollup(&groups),
            groups,
            matched: filtered.len(),
            total: snapshot.proposals.len(),
        }
    }

    /// Submit a decision as this console's actor.
    pub async fn submit(&self, pending: &PendingAction) -> DomainResult<DecisionOutcome> {
        let outcome = self.service.decide(&self.actor, pending).await?;

        if !self.is_alive() {
            tracing::debug!(
                proposal_id = %pending.proposal_id,
                "console closed; decision result not applied to snapshot"
            );
            return Ok(outcome);
        }

        let mut snapshot = self.snapshot.write().await;
        if let Some(slot) = snapshot
            .proposals
            .iter_mut()
            .find(|p| p.id == outcome.proposal.id)
        {
            let old_status = slot.status;
            *slot = outcome.proposal.clone();
            snapshot.statistics.decrement(old_status);
            snapshot.statistics.increment(outcome.proposal.status, 1);
        }
        Ok(outcome)
    }
}

//! Per-proposal mutual exclusion for in-flight decisions.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Set of proposal ids with an action currently in flight.
#[derive(Debug, Clone, Default)]
pub struct ActionLocks {
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl ActionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `proposal_id`, failing with `ActionInFlight` if it is already claimed.
    ///
    /// The claim is released when the returned guard is dropped.
    pub fn acquire(&self, proposal_id: Uuid) -> DomainResult<ActionGuard> {
        if !self.set().insert(proposal_id) {
            return Err(DomainError::ActionInFlight(proposal_id));
        }
        Ok(ActionGuard {
            locks: self.clone(),
            proposal_id,
        })
    }

    pub fn is_in_flight(&self, proposal_id: Uuid) -> bool {
        self.set().contains(&proposal_id)
    }

    fn set(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        // The set stays consistent even if a holder panicked.
        self.in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Releases its proposal id on drop.
#[derive(Debug)]
pub struct ActionGuard {
    locks: ActionLocks,
    proposal_id: Uuid,
}

impl ActionGuard {
    pub fn proposal_id(&self) -> Uuid {
        self.proposal_id
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.locks.set().remove(&self.proposal_id);
    }
}

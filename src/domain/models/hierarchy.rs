//! Derived region groupings and rollup counts. Never persisted.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use super::proposal::{Proposal, ProposalStatus, RegionRef, StatusBucket};

/// Per-bucket proposal counts. `revision` includes raw `rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rollup {
    pub pending: u64,
    pub in_review: u64,
    pub approved: u64,
    pub revision: u64,
    pub total: u64,
}

impl Rollup {
    /// Count one proposal in the given raw status.
    pub fn record(&mut self, status: ProposalStatus) {
        match status.bucket() {
            StatusBucket::Pending => self.pending += 1,
            StatusBucket::InReview => self.in_review += 1,
            StatusBucket::Approved => self.approved += 1,
            StatusBucket::Revision => self.revision += 1,
        }
        self.total += 1;
    }

    pub fn from_proposals<'a>(proposals: impl IntoIterator<Item = &'a Proposal>) -> Self {
        let mut rollup = Self::default();
        for p in proposals {
            rollup.record(p.status);
        }
        rollup
    }

    pub fn count(&self, bucket: StatusBucket) -> u64 {
        match bucket {
            StatusBucket::Pending => self.pending,
            StatusBucket::InReview => self.in_review,
            StatusBucket::Approved => self.approved,
            StatusBucket::Revision => self.revision,
        }
    }

    /// Derived display classification; recomputed on every call.
    pub fn classification(&self) -> GroupClassification {
        if self.revision > 0 {
            GroupClassification::NeedsAttention
        } else if self.total > 0 && self.approved == self.total {
            GroupClassification::FullyApproved
        } else if self.total == 0 {
            GroupClassification::Empty
        } else {
            GroupClassification::InProgress
        }
    }
}

impl AddAssign for Rollup {
    fn add_assign(&mut self, rhs: Self) {
        self.pending += rhs.pending;
        self.in_review += rhs.in_review;
        self.approved += rhs.approved;
        self.revision += rhs.revision;
        self.total += rhs.total;
    }
}

/// Visual/priority classification of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupClassification {
    NeedsAttention,
    FullyApproved,
    Empty,
    InProgress,
}

impl GroupClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NeedsAttention => "needs_attention",
            Self::FullyApproved => "fully_approved",
            Self::Empty => "empty",
            Self::InProgress => "in_progress",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NeedsAttention => "needs attention",
            Self::FullyApproved => "fully approved",
            Self::Empty => "empty",
            Self::InProgress => "in progress",
        }
    }
}

/// Proposals of one village with their rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageGroup {
    pub village: RegionRef,
    pub proposals: Vec<Proposal>,
    pub rollup: Rollup,
}

impl VillageGroup {
    pub fn classification(&self) -> GroupClassification {
        self.rollup.classification()
    }
}

/// Villages of one district with the district rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionGroup {
    pub district: RegionRef,
    pub villages: Vec<VillageGroup>,
    pub rollup: Rollup,
}

impl RegionGroup {
    pub fn classification(&self) -> GroupClassification {
        self.rollup.classification()
    }

    pub fn proposal_count(&self) -> usize {
        self.villages.iter().map(|v| v.proposals.len()).sum()
    }
}

/// Raw per-status counts, as served by the statistics endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusStatistics {
    pub pending: u64,
    pub in_review: u64,
    pub approved: u64,
    pub rejected: u64,
    pub revision: u64,
}

impl StatusStatistics {
    pub fn from_proposals<'a>(proposals: impl IntoIterator<Item = &'a Proposal>) -> Self {
        let mut stats = Self::default();
        for p in proposals {
            stats.increment(p.status, 1);
        }
        stats
    }

    pub fn increment(&mut self, status: ProposalStatus, by: u64) {
        match status {
            ProposalStatus::Pending => self.pending += by,
            ProposalStatus::InReview => self.in_review += by,
            ProposalStatus::Approved => self.approved += by,
            ProposalStatus::Rejected => self.rejected += by,
            ProposalStatus::Revision => self.revision += by,
        }
    }

    pub fn decrement(&mut self, status: ProposalStatus) {
        let slot = match status {
            ProposalStatus::Pending => &mut self.pending,
            ProposalStatus::InReview => &mut self.in_review,
            ProposalStatus::Approved => &mut self.approved,
            ProposalStatus::Rejected => &mut self.rejected,
            ProposalStatus::Revision => &mut self.revision,
        };
        *slot = slot.saturating_sub(1);
    }

    pub fn total(&self) -> u64 {
        self.pending + self.in_review + self.approved + self.rejected + self.revision
    }

    /// Merge into display buckets.
    pub fn to_rollup(&self) -> Rollup {
        Rollup {
            pending: self.pending,
            in_review: self.in_review,
            approved: self.approved,
            revision: self.revision + self.rejected,
            total: self.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rollup(pending: u64, in_review: u64, approved: u64, revision: u64) -> Rollup {
        Rollup {
            pending,
            in_review,
            approved,
            revision,
            total: pending + in_review + approved + revision,
        }
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(rollup(1, 0, 1, 1).classification(), GroupClassification::NeedsAttention);
        assert_eq!(rollup(0, 0, 3, 0).classification(), GroupClassification::FullyApproved);
        assert_eq!(rollup(0, 0, 0, 0).classification(), GroupClassification::Empty);
        assert_eq!(rollup(2, 1, 1, 0).classification(), GroupClassification::InProgress);
    }

    #[test]
    fn test_revision_wins_over_fully_approved() {
        // approved == total can't coexist with revision > 0, but revision is checked first
        assert_eq!(rollup(0, 0, 0, 2).classification(), GroupClassification::NeedsAttention);
    }

    #[test]
    fn test_record_merges_rejected() {
        let mut r = Rollup::default();
        r.record(ProposalStatus::Rejected);
        r.record(ProposalStatus::Revision);
        r.record(ProposalStatus::Pending);
        assert_eq!(r.revision, 2);
        assert_eq!(r.pending, 1);
        assert_eq!(r.total, 3);
    }

    #[test]
    fn test_statistics_to_rollup() {
        let stats = StatusStatistics {
            pending: 4,
            in_review: 2,
            approved: 7,
            rejected: 1,
            revision: 3,
        };
        let r = stats.to_rollup();
        assert_eq!(r.revision, 4);
        assert_eq!(r.total, 17);
    }
}

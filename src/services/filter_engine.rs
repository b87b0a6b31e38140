//! Search and categorical filtering of the flat proposal set.

use crate::domain::models::{ActivityKindFilter, Proposal, ProposalQuery};

/// Applies a [`ProposalQuery`] to a proposal slice.
///
/// Search text, status filter and activity-kind filter are combined with AND.
/// Input order is preserved and the input is never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn apply(&self, proposals: &[Proposal], query: &ProposalQuery) -> Vec<Proposal> {
        let needle = query.search_text.trim().to_lowercase();
        proposals
            .iter()
            .filter(|p| Self::matches_with_needle(p, query, &needle))
            .cloned()
            .collect()
    }

    /// Whether a single proposal passes the query.
    pub fn matches(&self, proposal: &Proposal, query: &ProposalQuery) -> bool {
        let needle = query.search_text.trim().to_lowercase();
        Self::matches_with_needle(proposal, query, &needle)
    }

    fn matches_with_needle(proposal: &Proposal, query: &ProposalQuery, needle: &str) -> bool {
        Self::matches_search(proposal, needle)
            && query.status_filter.matches(proposal.status)
            && Self::matches_kind(proposal, query.activity_kind_filter)
    }

    fn matches_search(proposal: &Proposal, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);
        contains(&proposal.title)
            || contains(&proposal.village.name)
            || contains(&proposal.district.name)
            || proposal.items.iter().any(|item| contains(&item.name))
    }

    fn matches_kind(proposal: &Proposal, filter: ActivityKindFilter) -> bool {
        match filter {
            ActivityKindFilter::All => true,
            ActivityKindFilter::Kind(kind) => proposal.has_activity_kind(kind),
        }
    }
}

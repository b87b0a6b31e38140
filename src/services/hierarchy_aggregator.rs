//! Groups proposals by district and village and rolls up status counts.

use std::collections::HashMap;

use crate::domain::models::{Proposal, RegionGroup, RegionRef, Rollup, VillageGroup};

/// Builds the district → village tree from an already filtered proposal set.
#[derive(Debug, Clone, Copy, Default)]
pub struct HierarchyAggregator;

impl HierarchyAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Group proposals into districts ordered by name, each with villages ordered by name.
    ///
    /// Proposals keep their input order inside a village. Groups are keyed by
    /// region id; the first proposal seen for an id supplies its display name.
    pub fn aggregate(&self, proposals: &[Proposal]) -> Vec<RegionGroup> {
        let mut districts: Vec<DistrictBuilder> = Vec::new();
        let mut district_index: HashMap<&str, usize> = HashMap::new();

        for proposal in proposals {
            let d = *district_index
                .entry(proposal.district.id.as_str())
                .or_insert_with(|| {
                    districts.push(DistrictBuilder::new(&proposal.district));
                    districts.len() - 1
                });
            districts[d].push(proposal);
        }

        let mut groups: Vec<RegionGroup> =
            districts.into_iter().map(DistrictBuilder::build).collect();
        groups.sort_by(|a, b| region_order(&a.district, &b.district));
        groups
    }

    /// Rollup across every district.
    pub fn global_rollup(groups: &[RegionGroup]) -> Rollup {
        let mut total = Rollup::default();
        for group in groups {
            total += group.rollup;
        }
        total
    }

    /// Whether village rollups sum to their district rollup and district
    /// rollups sum to the global rollup of `proposals`.
    pub fn rollups_consistent(groups: &[RegionGroup], proposals: &[Proposal]) -> bool {
        let districts_ok = groups.iter().all(|group| {
            let mut sum = Rollup::default();
            for village in &group.villages {
                if village.rollup != Rollup::from_proposals(&village.proposals) {
                    return false;
                }
                sum += village.rollup;
            }
            sum == group.rollup
        });
        districts_ok && Self::global_rollup(groups) == Rollup::from_proposals(proposals)
    }
}

struct DistrictBuilder<'a> {
    district: RegionRef,
    villages: Vec<(RegionRef, Vec<&'a Proposal>)>,
    village_index: HashMap<&'a str, usize>,
}

impl<'a> DistrictBuilder<'a> {
    fn new(district: &RegionRef) -> Self {
        Self {
            district: district.clone(),
            villages: Vec::new(),
            village_index: HashMap::new(),
        }
    }

    fn push(&mut self, proposal: &'a Proposal) {
        let villages = &mut self.villages;
        let v = *self
            .village_index
            .entry(proposal.village.id.as_str())
            .or_insert_with(|| {
                villages.push((proposal.village.clone(), Vec::new()));
                villages.len() - 1
            });
        self.villages[v].1.push(proposal);
    }

    fn build(self) -> RegionGroup {
        let mut villages: Vec<VillageGroup> = self
            .villages
            .into_iter()
            .map(|(village, proposals)| {
                let rollup = Rollup::from_proposals(proposals.iter().copied());
                VillageGroup {
                    village,
                    proposals: proposals.into_iter().cloned().collect(),
                    rollup,
                }
            })
            .collect();
        villages.sort_by(|a, b| region_order(&a.village, &b.village));

        let mut rollup = Rollup::default();
        for village in &villages {
            rollup += village.rollup;
        }

        RegionGroup {
            district: self.district,
            villages,
            rollup,
        }
    }
}

/// Alphabetical by name, case-insensitive, with id as tie-breaker so output is deterministic.
fn region_order(a: &RegionRef, b: &RegionRef) -> std::cmp::Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{GroupClassification, ProposalStatus};

    fn proposal(district: (&str, &str), village: (&str, &str), status: ProposalStatus) -> Proposal {
        Proposal::new(
            format!("Usulan {}", village.1),
            2025,
            RegionRef::new(village.0, village.1),
            RegionRef::new(district.0, district.1),
        )
        .with_status(status)
    }

    #[test]
    fn test_sukamaju_needs_attention() {
        let d = ("d1", "Cisarua");
        let v = ("v1", "Sukamaju");
        let proposals = vec![
            proposal(d, v, ProposalStatus::Approved),
            proposal(d, v, ProposalStatus::Pending),
            proposal(d, v, ProposalStatus::Rejected),
        ];
        let groups = HierarchyAggregator::new().aggregate(&proposals);
        assert_eq!(groups.len(), 1);
        let village = &groups[0].villages[0];
        assert_eq!(
            village.rollup,
            Rollup {
                pending: 1,
                in_review: 0,
                approved: 1,
                revision: 1,
                total: 3
            }
        );
        assert_eq!(village.classification(), GroupClassification::NeedsAttention);
    }

    #[test]
    fn test_ordering_by_name() {
        let proposals = vec![
            proposal(("d2", "Megamendung"), ("v3", "Sukagalih"), ProposalStatus::Pending),
            proposal(("d1", "Cisarua"), ("v2", "Tugu"), ProposalStatus::Approved),
            proposal(("d1", "Cisarua"), ("v1", "batulayang"), ProposalStatus::InReview),
        ];
        let groups = HierarchyAggregator::new().aggregate(&proposals);
        let districts: Vec<_> = groups.iter().map(|g| g.district.name.as_str()).collect();
        assert_eq!(districts, vec!["Cisarua", "Megamendung"]);
        let villages: Vec<_> = groups[0].villages.iter().map(|v| v.village.name.as_str()).collect();
        assert_eq!(villages, vec!["batulayang", "Tugu"]);
    }

    #[test]
    fn test_groups_by_id_not_name() {
        let proposals = vec![
            proposal(("d1", "Cisarua"), ("v1", "Cibeureum"), ProposalStatus::Pending),
            proposal(("d2", "Sukaraja"), ("v9", "Cibeureum"), ProposalStatus::Pending),
        ];
        let groups = HierarchyAggregator::new().aggregate(&proposals);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.villages.len() == 1));
    }

    #[test]
    fn test_rollups_are_consistent() {
        let proposals = vec![
            proposal(("d1", "Cisarua"), ("v1", "Tugu"), ProposalStatus::Approved),
            proposal(("d1", "Cisarua"), ("v2", "Citeko"), ProposalStatus::Revision),
            proposal(("d2", "Ciawi"), ("v3", "Bojong"), ProposalStatus::InReview),
        ];
        let groups = HierarchyAggregator::new().aggregate(&proposals);
        assert!(HierarchyAggregator::rollups_consistent(&groups, &proposals));
        assert_eq!(HierarchyAggregator::global_rollup(&groups).total, 3);
    }

    #[test]
    fn test_empty_input() {
        let groups = HierarchyAggregator::new().aggregate(&[]);
        assert!(groups.is_empty());
        assert_eq!(
            HierarchyAggregator::global_rollup(&groups).classification(),
            GroupClassification::Empty
        );
    }
}

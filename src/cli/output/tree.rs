use crate::domain::models::{Proposal, RegionGroup, Rollup, VillageGroup};

use super::{format_rupiah, short_id, styled_classification, styled_status, truncate};

/// Unicode box-drawing characters for tree visualization
const TREE_BRANCH: &str = "├── ";
const TREE_LAST: &str = "└── ";
const TREE_PIPE: &str = "│   ";
const TREE_SPACE: &str = "    ";

/// Render district → village → proposal groups as a tree.
///
/// Districts are roots; villages and their proposals hang below with
/// box-drawing connectors. Each group line carries its rollup and
/// classification.
pub fn render_region_tree(groups: &[RegionGroup]) -> String {
    let mut output = String::new();

    for (i, group) in groups.iter().enumerate() {
        output.push_str(&format!(
            "{} {} [{}]\n",
            console::style(&group.district.name).bold(),
            rollup_summary(&group.rollup),
            styled_classification(group.classification()),
        ));

        for (j, village) in group.villages.iter().enumerate() {
            let is_last = j == group.villages.len() - 1;
            output.push_str(&render_village(village, is_last));
        }

        if i < groups.len() - 1 {
            output.push('\n');
        }
    }

    output
}

fn render_village(village: &VillageGroup, is_last: bool) -> String {
    let connector = if is_last { TREE_LAST } else { TREE_BRANCH };
    let child_prefix = if is_last { TREE_SPACE } else { TREE_PIPE };

    let mut output = format!(
        "{}{} {} [{}]\n",
        connector,
        village.village.name,
        rollup_summary(&village.rollup),
        styled_classification(village.classification()),
    );

    for (k, proposal) in village.proposals.iter().enumerate() {
        let last_child = k == village.proposals.len() - 1;
        output.push_str(&render_proposal(proposal, child_prefix, last_child));
    }

    output
}

fn render_proposal(proposal: &Proposal, prefix: &str, is_last: bool) -> String {
    let connector = if is_last { TREE_LAST } else { TREE_BRANCH };
    format!(
        "{}{}{} {} ({}) [{}]\n",
        prefix,
        connector,
        styled_status(proposal.status),
        truncate(&proposal.title, 48),
        format_rupiah(proposal.total_budget()),
        short_id(&proposal.id),
    )
}

/// "3 proposals: 1 pending, 1 in review, 1 approved, 0 revision"
pub fn rollup_summary(rollup: &Rollup) -> String {
    format!(
        "{} proposal{}: {} pending, {} in review, {} approved, {} revision",
        rollup.total,
        if rollup.total == 1 { "" } else { "s" },
        rollup.pending,
        rollup.in_review,
        rollup.approved,
        rollup.revision,
    )
}

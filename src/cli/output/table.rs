//! Table output formatting for CLI commands
//!
//! Proposal lists, status statistics and decision history rendered with
//! comfy-table. Colors are dropped when `NO_COLOR` is set or the terminal
//! cannot show them.

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::env;

use super::{format_rupiah, short_id, truncate};
use crate::domain::models::{Proposal, ProposalStatus, StatusStatistics, VerificationEvent};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Format a flat list of proposals
    pub fn format_proposals(&self, proposals: &[Proposal]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["ID", "Title", "Village", "District", "Status", "Budget"]));

        for proposal in proposals {
            table.add_row(vec![
                Cell::new(short_id(&proposal.id)),
                Cell::new(truncate(&proposal.title, 40)),
                Cell::new(&proposal.village.name),
                Cell::new(&proposal.district.name),
                self.status_cell(proposal.status),
                Cell::new(format_rupiah(proposal.total_budget()))
                    .set_alignment(CellAlignment::Right),
            ]);
        }

        table.to_string()
    }

    /// Format raw per-status counts
    pub fn format_statistics(&self, stats: &StatusStatistics) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["Status", "Count"]));

        let rows = [
            (ProposalStatus::Pending, stats.pending),
            (ProposalStatus::InReview, stats.in_review),
            (ProposalStatus::Approved, stats.approved),
            (ProposalStatus::Revision, stats.revision),
            (ProposalStatus::Rejected, stats.rejected),
        ];
        for (status, count) in rows {
            table.add_row(vec![
                self.status_cell(status),
                Cell::new(count).set_alignment(CellAlignment::Right),
            ]);
        }
        table.add_row(vec![
            Cell::new("total").add_attribute(Attribute::Bold),
            Cell::new(stats.total())
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
        ]);

        table.to_string()
    }

    /// Format a decision history, oldest first
    pub fn format_history(&self, events: &[VerificationEvent]) -> String {
        let mut table = self.create_base_table();
        table.set_header(header(&["When", "Action", "From", "To", "Actor", "Note"]));

        for event in events {
            table.add_row(vec![
                Cell::new(event.recorded_at.format("%Y-%m-%d %H:%M").to_string()),
                Cell::new(event.action),
                self.status_cell(event.old_status),
                self.status_cell(event.new_status),
                Cell::new(format!("{} ({})", event.actor.name, event.actor.role)),
                Cell::new(
                    event
                        .note
                        .as_deref()
                        .map_or_else(|| "-".to_string(), |n| truncate(n, 40)),
                ),
            ]);
        }

        table.to_string()
    }

    fn status_cell(&self, status: ProposalStatus) -> Cell {
        if self.use_colors {
            Cell::new(status).fg(status_color(status))
        } else {
            Cell::new(format!("{} {}", status_icon(status), status))
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.use_colors {
            table.force_no_tty();
        }
        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

fn supports_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::colors_enabled()
}

fn status_color(status: ProposalStatus) -> Color {
    match status {
        ProposalStatus::Approved => Color::Green,
        ProposalStatus::InReview => Color::Cyan,
        ProposalStatus::Pending => Color::Yellow,
        ProposalStatus::Revision | ProposalStatus::Rejected => Color::Red,
    }
}

fn status_icon(status: ProposalStatus) -> &'static str {
    match status {
        ProposalStatus::Approved => "✓",
        ProposalStatus::InReview => "⟳",
        ProposalStatus::Pending => "○",
        ProposalStatus::Revision | ProposalStatus::Rejected => "✗",
    }
}

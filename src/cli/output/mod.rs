//! Output formatting utilities for the CLI.

pub mod table;
pub mod tree;

use console::{style, StyledObject};
use serde::Serialize;

use crate::domain::models::{GroupClassification, ProposalStatus};

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    } else {
        println!("{}", result.to_human());
    }
}

/// Truncate a string to at most `max_len` characters, appending "..." if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// First 8 characters of an id, for list display.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

/// Rupiah amount with dot thousands separators ("Rp 1.250.000").
pub fn format_rupiah(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp {grouped}")
}

/// Styled status label.
pub fn styled_status(status: ProposalStatus) -> StyledObject<&'static str> {
    let text = status.as_str();
    match status {
        ProposalStatus::Approved => style(text).green().bold(),
        ProposalStatus::InReview => style(text).cyan(),
        ProposalStatus::Pending => style(text).yellow(),
        ProposalStatus::Revision | ProposalStatus::Rejected => style(text).red(),
    }
}

/// Styled classification label for region groups.
pub fn styled_classification(class: GroupClassification) -> StyledObject<&'static str> {
    let text = class.label();
    match class {
        GroupClassification::NeedsAttention => style(text).yellow().bold(),
        GroupClassification::FullyApproved => style(text).green(),
        GroupClassification::InProgress => style(text).cyan(),
        GroupClassification::Empty => style(text).dim(),
    }
}

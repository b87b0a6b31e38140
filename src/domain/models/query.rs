//! Explicit, serializable view query passed into the filter engine.

use serde::{Deserialize, Serialize};

use super::proposal::{ActivityKind, ProposalStatus};

/// Status filter. `Status(Revision)` also matches raw `Rejected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Status(ProposalStatus),
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Status(status) => status.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            return Some(Self::All);
        }
        ProposalStatus::from_str(s).map(Self::Status)
    }

    pub fn matches(&self, status: ProposalStatus) -> bool {
        match self {
            Self::All => true,
            Self::Status(ProposalStatus::Revision) => {
                matches!(status, ProposalStatus::Revision | ProposalStatus::Rejected)
            }
            Self::Status(wanted) => *wanted == status,
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("Unknown status filter: {value}"))
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        value.as_str().to_string()
    }
}

/// Activity-kind filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActivityKindFilter {
    #[default]
    All,
    Kind(ActivityKind),
}

impl ActivityKindFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Kind(kind) => kind.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") || s.trim().is_empty() {
            return Some(Self::All);
        }
        ActivityKind::from_str(s).map(Self::Kind)
    }
}

impl TryFrom<String> for ActivityKindFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("Unknown activity kind filter: {value}"))
    }
}

impl From<ActivityKindFilter> for String {
    fn from(value: ActivityKindFilter) -> Self {
        value.as_str().to_string()
    }
}

/// Search text plus categorical filters, combined with logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProposalQuery {
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub activity_kind_filter: ActivityKindFilter,
}

impl ProposalQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_status(mut self, filter: StatusFilter) -> Self {
        self.status_filter = filter;
        self
    }

    pub fn with_activity_kind(mut self, filter: ActivityKindFilter) -> Self {
        self.activity_kind_filter = filter;
        self
    }
}

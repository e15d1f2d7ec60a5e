//! Issue and board shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_as_default;

/// Issue status, one board column per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Done,
    Blocked,
}

impl IssueStatus {
    /// All statuses in board column order.
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Pending,
        IssueStatus::InProgress,
        IssueStatus::Done,
        IssueStatus::Blocked,
    ];

    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Done => "done",
            IssueStatus::Blocked => "blocked",
        }
    }

    /// Parse from the wire representation.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().replace('_', " "))
    }
}

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compact issue representation used in lists and cross-references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: String,
    pub title: String,
    pub status: IssueStatus,
    pub priority: Priority,
}

/// Full issue detail, fetched on demand.
///
/// `children`, `blocks` and `blocked_by` reference other issues by id; they are
/// summaries, not owned copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub status: IssueStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<IssueSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocks: Vec<IssueSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked_by: Vec<IssueSummary>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub done_when: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// The summary view of this issue.
    pub fn summary(&self) -> IssueSummary {
        IssueSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            priority: self.priority,
        }
    }
}

/// One status column of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub status: IssueStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    pub count: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<IssueSummary>,
}

impl Column {
    /// Label to display, falling back to the status name.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            self.status.to_string()
        } else {
            self.label.clone()
        }
    }
}

/// Issues grouped into status columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<Column>,
    pub total: usize,
}

impl BoardResponse {
    /// Check the board's reported counts against its contents.
    ///
    /// Every column's count must equal its issue list length and the column
    /// counts must sum to `total`. The board is displayed either way; this is
    /// for diagnostics only.
    pub fn is_consistent(&self) -> bool {
        let columns_ok = self.columns.iter().all(|c| c.count == c.issues.len());
        let sum: usize = self.columns.iter().map(|c| c.count).sum();
        columns_ok && sum == self.total
    }

    /// Find an issue summary anywhere on the board.
    pub fn find_issue(&self, id: &str) -> Option<&IssueSummary> {
        self.columns
            .iter()
            .flat_map(|c| c.issues.iter())
            .find(|i| i.id == id)
    }
}

/// Response from `GET /issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<Issue>,
    pub total: usize,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

/// Query parameters for `GET /issues`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub parent: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for IssueFilter {
    fn default() -> Self {
        Self {
            status: None,
            parent: None,
            search: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl IssueFilter {
    /// Query pairs in a stable order; unset filters are omitted.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(parent) = &self.parent {
            pairs.push(("parent", parent.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

//! Dependency graph shapes.
//!
//! The daemon computes the graph; the client only lists nodes and their edges
//! and hands node activations back to the issue overlay.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::issue::{IssueStatus, Priority};
use super::null_as_default;

/// Kind of dependency relationship between two issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Blocks,
    BlockedBy,
    Parent,
    Child,
    WaitsFor,
    WaitedBy,
    ConditionalBlocks,
    RelatesTo,
    Duplicates,
    Mentions,
    DerivedFrom,
    Supersedes,
    Implements,
    #[serde(other)]
    Unknown,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Blocks => "blocks",
            EdgeType::BlockedBy => "blocked_by",
            EdgeType::Parent => "parent",
            EdgeType::Child => "child",
            EdgeType::WaitsFor => "waits_for",
            EdgeType::WaitedBy => "waited_by",
            EdgeType::ConditionalBlocks => "conditional_blocks",
            EdgeType::RelatesTo => "relates_to",
            EdgeType::Duplicates => "duplicates",
            EdgeType::Mentions => "mentions",
            EdgeType::DerivedFrom => "derived_from",
            EdgeType::Supersedes => "supersedes",
            EdgeType::Implements => "implements",
            EdgeType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the dependency graph (one per issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub status: IssueStatus,
    pub priority: Priority,
}

/// A directed edge in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// Statistics reported alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    #[serde(default)]
    pub node_count: usize,
    #[serde(default)]
    pub edge_count: usize,
    #[serde(default)]
    pub max_depth: usize,
}

/// Response from `GET /graph?format=json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<GraphNode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<GraphEdge>,
    #[serde(default)]
    pub stats: GraphStats,
}

impl GraphResponse {
    /// Look up a node by issue id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges leaving `id`, in the order the daemon reported them.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }
}

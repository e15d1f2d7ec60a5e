//! Data models for the entities served by the gvid daemon.
//!
//! This module defines the shapes decoded at the transport boundary:
//! - `issue` - Issues, board columns and the board itself
//! - `graph` - Dependency graph nodes, edges and stats
//! - `town` - Gas Town fleet: agents, rigs, convoys, molecules, mail
//!
//! Every entity is an immutable snapshot of what the daemon reported. The
//! client never mutates or repairs them; derived values live in
//! [`crate::stats`].

pub mod graph;
pub mod issue;
pub mod town;

use serde::{Deserialize, Deserializer, Serialize};

pub use graph::{EdgeType, GraphEdge, GraphNode, GraphResponse, GraphStats};
pub use issue::{
    BoardResponse, Column, Issue, IssueFilter, IssueListResponse, IssueStatus, IssueSummary,
    Priority,
};
pub use town::{
    Agent, AgentRole, AgentStatus, AgentsResponse, Convoy, ConvoysResponse, MailMessage,
    MailResponse, Molecule, MoleculeStep, MoleculesResponse, Rig, RigsResponse, Town, TownStatus,
    WorkStatus,
};

/// Response from the `/health` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub beads_initialized: bool,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bd_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decode `null` as the type's default.
///
/// The daemon serializes empty lists as `[]`, `null`, or leaves the field out
/// entirely. Combined with `#[serde(default)]` this treats all three as empty.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_optional_fields() {
        let json = r#"{"status":"ok","beads_initialized":true,"version":"0.1.0"}"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "ok");
        assert!(health.beads_initialized);
        assert!(health.bd_version.is_none());
        assert!(health.error.is_none());
    }

    #[test]
    fn test_health_response_missing_version_is_error() {
        let json = r#"{"status":"ok"}"#;
        assert!(serde_json::from_str::<HealthResponse>(json).is_err());
    }
}

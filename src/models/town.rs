//! Gas Town fleet shapes: agents, rigs, convoys, molecules and mail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::null_as_default;

/// Role of a Gas Town agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Mayor,
    Deacon,
    Witness,
    Refinery,
    Crew,
    Polecat,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Mayor => "mayor",
            AgentRole::Deacon => "deacon",
            AgentRole::Witness => "witness",
            AgentRole::Refinery => "refinery",
            AgentRole::Crew => "crew",
            AgentRole::Polecat => "polecat",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Liveness status of an agent. Anything the client does not recognise is `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Idle,
    Stuck,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Idle => "idle",
            AgentStatus::Stuck => "stuck",
            AgentStatus::Offline => "offline",
            AgentStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status shared by convoys and molecules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Pending,
    InProgress,
    Complete,
    Blocked,
    Failed,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Pending => "pending",
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Complete => "complete",
            WorkStatus::Blocked => "blocked",
            WorkStatus::Failed => "failed",
        }
    }

    /// Still moving through the pipeline (not complete, not failed).
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            WorkStatus::Pending | WorkStatus::InProgress | WorkStatus::Blocked
        )
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().replace('_', " "))
    }
}

/// A Gas Town agent (mayor, deacon, witness, refinery, crew member or polecat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub role: AgentRole,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub molecule: Option<String>,
    #[serde(default)]
    pub hook_attached: bool,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compaction: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    /// Mail-style address of this agent (e.g. `mayor/`, `gastown/witness`).
    pub fn address(&self) -> String {
        let rig = self.rig.as_deref().unwrap_or_default();
        match self.role {
            AgentRole::Mayor => "mayor/".to_string(),
            AgentRole::Deacon => "deacon/".to_string(),
            AgentRole::Witness => format!("{}/witness", rig),
            AgentRole::Refinery => format!("{}/refinery", rig),
            AgentRole::Crew | AgentRole::Polecat => format!("{}/{}", rig, self.name),
        }
    }
}

/// A project container and the agents working its checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rig {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinery: Option<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub polecats: Vec<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub crew: Vec<Agent>,
}

impl Rig {
    /// Every agent of the rig: witness, refinery, polecats, then crew.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.witness
            .iter()
            .chain(self.refinery.iter())
            .chain(self.polecats.iter())
            .chain(self.crew.iter())
    }
}

/// A tracked batch of related issues.
///
/// The counters are what the daemon reported. They are never recomputed and
/// may disagree with each other or with `issues`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Convoy {
    pub id: String,
    pub title: String,
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issues: Vec<String>,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub completed: u32,
    #[serde(default)]
    pub blocked: u32,
    #[serde(default)]
    pub in_progress: u32,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<String>,
}

/// The whole fleet at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Town {
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rigs: Vec<Rig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mayor: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deacon: Option<Agent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub convoys: Vec<Convoy>,
}

impl Town {
    /// Town-level agents (mayor, then deacon) that are present.
    pub fn town_agents(&self) -> impl Iterator<Item = &Agent> {
        self.mayor.iter().chain(self.deacon.iter())
    }
}

/// Fleet health summary, fetched independently of [`Town`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TownStatus {
    pub healthy: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub town_root: String,
    #[serde(default)]
    pub active_agents: u32,
    #[serde(default)]
    pub total_agents: u32,
    #[serde(default)]
    pub active_rigs: u32,
    #[serde(default)]
    pub open_convoys: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One step of a molecule workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculeStep {
    #[serde(default)]
    pub index: u32,
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub needs: Vec<String>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A decomposed unit of work with ordered steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: String,
    pub title: String,
    pub status: WorkStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<MoleculeStep>,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A mail message between agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(
        default,
        deserialize_with = "optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub message_type: String,
}

/// Response from `GET /town/rigs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RigsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rigs: Vec<Rig>,
    pub total: usize,
}

/// Response from `GET /town/agents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub agents: Vec<Agent>,
    pub total: usize,
    #[serde(default)]
    pub active: usize,
    #[serde(default)]
    pub offline: usize,
}

/// Response from `GET /town/convoys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvoysResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub convoys: Vec<Convoy>,
    pub total: usize,
    #[serde(default)]
    pub in_progress: usize,
    #[serde(default)]
    pub pending: usize,
    #[serde(default)]
    pub complete: usize,
    #[serde(default)]
    pub blocked: usize,
}

/// Response from `GET /town/molecules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub molecules: Vec<Molecule>,
    pub total: usize,
    #[serde(default)]
    pub in_progress: usize,
    #[serde(default)]
    pub pending: usize,
    #[serde(default)]
    pub complete: usize,
    #[serde(default)]
    pub blocked: usize,
}

/// Response from `GET /town/mail/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<MailMessage>,
    pub total: usize,
}

/// Decode an optional RFC 3339 timestamp, treating `""` and the Go zero time as absent.
fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => crate::freshness::parse_timestamp(&raw).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

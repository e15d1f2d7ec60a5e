//! One-shot reads of daemon resources and their text rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Output, json_line};
use crate::Result;
use crate::cli::GraphFormat;
use crate::client::ApiClient;
use crate::freshness::time_ago;
use crate::models::{
    Agent, AgentsResponse, BoardResponse, Convoy, ConvoysResponse, GraphResponse, Issue,
    IssueFilter, IssueListResponse, IssueSummary, MailResponse, Molecule, MoleculesResponse, Rig,
    RigsResponse, Town, TownStatus,
};
use crate::stats::{NO_RIGS_MESSAGE, gastown_tab_label, rig_agent_counts, town_agent_counts};

/// Daemon health plus the client's own build info.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub url: String,
    pub status: String,
    pub beads_initialized: bool,
    pub daemon_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bd_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub client_version: &'static str,
    pub client_commit: &'static str,
    pub client_built_at: &'static str,
}

impl Output for HealthReport {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("gvid at {}: {}", self.url, self.status)];
        lines.push(format!("  daemon version: {}", self.daemon_version));
        let beads = match (self.beads_initialized, &self.bd_version) {
            (true, Some(v)) => format!("yes (bd {})", v),
            (true, None) => "yes".to_string(),
            (false, _) => "no".to_string(),
        };
        lines.push(format!("  beads initialized: {}", beads));
        if let Some(ref err) = self.error {
            lines.push(format!("  error: {}", err));
        }
        lines.push(format!(
            "  gvi {} ({}, built {})",
            self.client_version, self.client_commit, self.client_built_at
        ));
        lines.join("\n")
    }
}

pub async fn health(client: &ApiClient) -> Result<HealthReport> {
    let health = client.health().await?;
    Ok(HealthReport {
        url: client.base_url().to_string(),
        status: health.status,
        beads_initialized: health.beads_initialized,
        daemon_version: health.version,
        bd_version: health.bd_version,
        error: health.error,
        client_version: env!("CARGO_PKG_VERSION"),
        client_commit: env!("GVI_GIT_COMMIT"),
        client_built_at: env!("GVI_BUILD_TIMESTAMP"),
    })
}

pub async fn board(client: &ApiClient) -> Result<BoardResponse> {
    let board = client.board().await?;
    if !board.is_consistent() {
        tracing::warn!(total = board.total, "board column counts do not add up to total");
    }
    Ok(board)
}

pub async fn issue(client: &ApiClient, id: &str) -> Result<Issue> {
    Ok(client.issue(id).await?)
}

pub async fn issues(client: &ApiClient, filter: &IssueFilter) -> Result<IssueListResponse> {
    Ok(client.issues(filter).await?)
}

/// Graph in whichever format was asked for.
#[derive(Debug, Clone)]
pub enum GraphOutput {
    Json(GraphResponse),
    /// Graphviz text, printed as-is in both output modes.
    Dot(String),
}

pub async fn graph(client: &ApiClient, format: GraphFormat) -> Result<GraphOutput> {
    Ok(match format {
        GraphFormat::Json => GraphOutput::Json(client.graph_json().await?),
        GraphFormat::Dot => GraphOutput::Dot(client.graph_dot().await?),
    })
}

pub async fn town(client: &ApiClient) -> Result<Town> {
    Ok(client.town().await?)
}

pub async fn status(client: &ApiClient) -> Result<TownStatus> {
    Ok(client.town_status().await?)
}

/// All rigs, or the named one.
pub async fn rigs(client: &ApiClient, name: Option<&str>) -> Result<Box<dyn Output>> {
    Ok(match name {
        Some(name) => Box::new(client.rig(name).await?),
        None => Box::new(client.rigs().await?),
    })
}

pub async fn agents(client: &ApiClient) -> Result<AgentsResponse> {
    Ok(client.agents().await?)
}

/// All convoys, or one by id.
pub async fn convoys(client: &ApiClient, id: Option<&str>) -> Result<Box<dyn Output>> {
    Ok(match id {
        Some(id) => Box::new(client.convoy(id).await?),
        None => Box::new(client.convoys().await?),
    })
}

/// All molecules, or one by id.
pub async fn molecules(client: &ApiClient, id: Option<&str>) -> Result<Box<dyn Output>> {
    Ok(match id {
        Some(id) => Box::new(client.molecule(id).await?),
        None => Box::new(client.molecules().await?),
    })
}

pub async fn mail(client: &ApiClient, address: &str) -> Result<MailResponse> {
    Ok(client.mail(address).await?)
}

fn summary_line(issue: &IssueSummary) -> String {
    format!("{} [{}] {}", issue.id, issue.priority, issue.title)
}

fn agent_line(agent: &Agent, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{:<24} {:<9} {:<8}",
        agent.address(),
        agent.role.as_str(),
        agent.status.as_str()
    );
    let age = time_ago(agent.last_active, now);
    if !age.is_empty() {
        line.push(' ');
        line.push_str(&age);
    }
    if agent.hook_attached {
        line.push_str(" [hooked]");
    }
    if let Some(ref molecule) = agent.molecule {
        line.push_str(&format!(" on {}", molecule));
    }
    line.trim_end().to_string()
}

fn rig_block(rig: &Rig, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", rig.name, rig_agent_counts(rig).label())];
    lines.push(format!("  path: {}", rig.path));
    if let Some(ref remote) = rig.remote {
        lines.push(format!("  remote: {}", remote));
    }
    for agent in rig.agents() {
        lines.push(format!("  {}", agent_line(agent, now)));
    }
    lines
}

fn convoy_line(convoy: &Convoy) -> String {
    let mut line = format!(
        "{} {} [{}] {}/{}",
        convoy.id, convoy.title, convoy.status, convoy.progress, convoy.total
    );
    if let Some(ref rig) = convoy.rig {
        line.push_str(&format!(" ({})", rig));
    }
    line
}

fn molecule_line(molecule: &Molecule) -> String {
    format!(
        "{} {} [{}] {}/{}",
        molecule.id, molecule.title, molecule.status, molecule.progress, molecule.total
    )
}

impl Output for BoardResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("Board ({})", self.total)];
        for column in &self.columns {
            lines.push(String::new());
            lines.push(format!("{} ({})", column.display_label(), column.count));
            if column.issues.is_empty() {
                lines.push("  (empty)".to_string());
            }
            for issue in &column.issues {
                lines.push(format!("  {}", summary_line(issue)));
            }
        }
        if !self.is_consistent() {
            lines.push(String::new());
            lines.push("warning: column counts do not add up to the board total".to_string());
        }
        lines.join("\n")
    }
}

impl Output for Issue {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!("{}: {}", self.id, self.title)];
        lines.push(format!(
            "  status: {}  priority: {}",
            self.status, self.priority
        ));
        if let Some(ref parent) = self.parent {
            lines.push(format!("  parent: {}", summary_line(parent)));
        }
        if !self.description.is_empty() {
            lines.push(String::new());
            lines.extend(self.description.lines().map(|l| format!("  {}", l)));
        }
        if !self.done_when.is_empty() {
            lines.push(String::new());
            lines.push("  done when:".to_string());
            lines.extend(self.done_when.iter().map(|c| format!("    - {}", c)));
        }
        for (label, related) in [
            ("children", &self.children),
            ("blocks", &self.blocks),
            ("blocked by", &self.blocked_by),
        ] {
            if !related.is_empty() {
                lines.push(format!("  {}:", label));
                lines.extend(related.iter().map(|i| format!("    {}", summary_line(i))));
            }
        }
        lines.push(format!(
            "  created {}, updated {}",
            self.created_at.format("%Y-%m-%d %H:%M"),
            self.updated_at.format("%Y-%m-%d %H:%M")
        ));
        lines.join("\n")
    }
}

impl Output for IssueListResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} of {} issues (offset {})",
            self.issues.len(),
            self.total,
            self.offset
        )];
        for issue in &self.issues {
            lines.push(format!("  {} ({})", summary_line(&issue.summary()), issue.status));
        }
        lines.join("\n")
    }
}

impl Output for GraphOutput {
    fn to_json(&self) -> String {
        match self {
            GraphOutput::Json(graph) => json_line(graph),
            GraphOutput::Dot(dot) => dot.clone(),
        }
    }

    fn to_human(&self) -> String {
        let graph = match self {
            GraphOutput::Json(graph) => graph,
            GraphOutput::Dot(dot) => return dot.clone(),
        };
        let mut lines = vec![format!(
            "{} nodes, {} edges, max depth {}",
            graph.stats.node_count, graph.stats.edge_count, graph.stats.max_depth
        )];
        for node in &graph.nodes {
            lines.push(format!(
                "{} [{}] {} ({})",
                node.id, node.priority, node.title, node.status
            ));
            for edge in graph.outgoing(&node.id) {
                lines.push(format!("  {} -> {}", edge.edge_type, edge.to));
            }
        }
        lines.join("\n")
    }
}

impl Output for Town {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let now = Utc::now();
        let mut lines = vec![format!(
            "{} ({}, {})",
            self.name.as_deref().unwrap_or("Gas Town"),
            self.root,
            town_agent_counts(self).label()
        )];

        for agent in self.town_agents() {
            lines.push(format!("  {}", agent_line(agent, now)));
        }

        lines.push(String::new());
        lines.push("Rigs".to_string());
        if self.rigs.is_empty() {
            lines.push(format!("  {}", NO_RIGS_MESSAGE));
        }
        for rig in &self.rigs {
            lines.extend(rig_block(rig, now).into_iter().map(|l| format!("  {}", l)));
        }

        if !self.convoys.is_empty() {
            lines.push(String::new());
            lines.push("Convoys".to_string());
            lines.extend(self.convoys.iter().map(|c| format!("  {}", convoy_line(c))));
        }
        lines.join("\n")
    }
}

impl Output for TownStatus {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} {}",
            gastown_tab_label(Some(self)),
            if self.healthy { "healthy" } else { "unhealthy" }
        )];
        if !self.town_root.is_empty() {
            lines.push(format!("  root: {}", self.town_root));
        }
        lines.push(format!(
            "  agents: {}/{} active",
            self.active_agents, self.total_agents
        ));
        lines.push(format!("  rigs: {} active", self.active_rigs));
        lines.push(format!("  convoys: {} open", self.open_convoys));
        if let Some(ref err) = self.error {
            lines.push(format!("  error: {}", err));
        }
        lines.join("\n")
    }
}

impl Output for RigsResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        if self.rigs.is_empty() {
            return NO_RIGS_MESSAGE.to_string();
        }
        self.rigs
            .iter()
            .map(|rig| format!("{} ({})", rig.name, rig_agent_counts(rig).label()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Output for Rig {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        rig_block(self, Utc::now()).join("\n")
    }
}

impl Output for AgentsResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let now = Utc::now();
        let mut lines = vec![format!(
            "{} agents: {} active, {} offline",
            self.total, self.active, self.offline
        )];
        lines.extend(self.agents.iter().map(|a| format!("  {}", agent_line(a, now))));
        lines.join("\n")
    }
}

impl Output for ConvoysResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} convoys: {} in progress, {} pending, {} complete, {} blocked",
            self.total, self.in_progress, self.pending, self.complete, self.blocked
        )];
        lines.extend(self.convoys.iter().map(|c| format!("  {}", convoy_line(c))));
        lines.join("\n")
    }
}

impl Output for Convoy {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![convoy_line(self)];
        lines.push(format!(
            "  completed {}, in progress {}, blocked {}",
            self.completed, self.in_progress, self.blocked
        ));
        if !self.issues.is_empty() {
            lines.push(format!("  issues: {}", self.issues.join(", ")));
        }
        if !self.agents.is_empty() {
            lines.push(format!("  agents: {}", self.agents.join(", ")));
        }
        if let Some(updated) = self.updated_at {
            lines.push(format!("  updated {}", time_ago(Some(updated), Utc::now())));
        }
        lines.join("\n")
    }
}

impl Output for MoleculesResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} molecules: {} in progress, {} pending, {} complete, {} blocked",
            self.total, self.in_progress, self.pending, self.complete, self.blocked
        )];
        lines.extend(self.molecules.iter().map(|m| format!("  {}", molecule_line(m))));
        lines.join("\n")
    }
}

impl Output for Molecule {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![molecule_line(self)];
        if let Some(ref formula) = self.formula {
            lines.push(format!("  formula: {}", formula));
        }
        if let Some(ref agent) = self.agent {
            lines.push(format!("  agent: {}", agent));
        }
        for step in &self.steps {
            let marker = if step.index == self.current_step { ">" } else { " " };
            let mut line = format!("  {} {}. {} [{}]", marker, step.index, step.id, step.status);
            if !step.needs.is_empty() {
                line.push_str(&format!(" needs {}", step.needs.join(", ")));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

impl Output for MailResponse {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        let now = Utc::now();
        let mut lines = vec![format!("{} messages", self.total)];
        for message in &self.messages {
            let unread = if message.read { " " } else { "*" };
            lines.push(format!(
                "{} {} from {}: {} {}",
                unread,
                message.id,
                message.from,
                message.subject,
                time_ago(message.timestamp, now)
            ));
        }
        lines.join("\n")
    }
}

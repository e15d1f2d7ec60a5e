//! Derived values computed from the current snapshot.
//!
//! Everything here is a pure function of its inputs and is recomputed on every
//! render. Nothing is cached: a cached count would lag the 5 second poll.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::freshness::time_ago;
use crate::models::{Agent, BoardResponse, Rig, Town, TownStatus};

/// Shown in place of the rig list when the town has none.
pub const NO_RIGS_MESSAGE: &str = "No rigs configured. Run `gt rig add <name>`";

/// Active and total agent counts for a group of agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentCounts {
    pub active: usize,
    pub total: usize,
}

impl AgentCounts {
    fn tally<'a>(agents: impl Iterator<Item = &'a Agent>) -> Self {
        agents.fold(Self::default(), |mut counts, agent| {
            counts.total += 1;
            if agent.is_active() {
                counts.active += 1;
            }
            counts
        })
    }

    /// `"{active}/{total} active"`, as shown in rig headers.
    pub fn label(&self) -> String {
        format!("{}/{} active", self.active, self.total)
    }
}

/// Counts over the rig's witness, refinery, polecats and crew.
pub fn rig_agent_counts(rig: &Rig) -> AgentCounts {
    AgentCounts::tally(rig.agents())
}

/// Counts over every agent in the town, including the mayor and deacon.
pub fn town_agent_counts(town: &Town) -> AgentCounts {
    AgentCounts::tally(
        town.town_agents()
            .chain(town.rigs.iter().flat_map(|rig| rig.agents())),
    )
}

/// Label for the Board tab: `Board (N)`, with 0 when no board has loaded.
pub fn board_tab_label(board: Option<&BoardResponse>) -> String {
    format!("Board ({})", board.map_or(0, |b| b.total))
}

/// Label for the Gas Town tab: filled dot when the town reports healthy.
pub fn gastown_tab_label(status: Option<&TownStatus>) -> String {
    let indicator = if status.is_some_and(|s| s.healthy) {
        "●"
    } else {
        "○"
    };
    format!("Gas Town {}", indicator)
}

/// Freshness label for an agent's last activity.
pub fn agent_freshness(agent: &Agent, now: DateTime<Utc>) -> String {
    time_ago(agent.last_active, now)
}

//! TUI Views module
//!
//! One view per tab plus the issue detail overlay, and the colour helpers
//! they share.

mod board;
mod graph;
mod issue_detail;
mod town;

pub use board::BoardView;
pub use graph::GraphView;
pub use issue_detail::IssueDetailView;
pub use town::TownView;

use ratatui::style::Color;

use crate::models::{AgentStatus, IssueStatus, Priority, WorkStatus};

fn status_color(status: IssueStatus) -> Color {
    match status {
        IssueStatus::Done => Color::Green,
        IssueStatus::InProgress => Color::Yellow,
        IssueStatus::Pending => Color::White,
        IssueStatus::Blocked => Color::Red,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Critical => Color::Red,
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::DarkGray,
    }
}

fn agent_status_color(status: AgentStatus) -> Color {
    match status {
        AgentStatus::Active => Color::Green,
        AgentStatus::Idle => Color::Gray,
        AgentStatus::Stuck => Color::Red,
        AgentStatus::Offline | AgentStatus::Unknown => Color::DarkGray,
    }
}

fn work_status_color(status: WorkStatus) -> Color {
    match status {
        WorkStatus::Complete => Color::Green,
        WorkStatus::InProgress => Color::Yellow,
        WorkStatus::Pending => Color::White,
        WorkStatus::Blocked | WorkStatus::Failed => Color::Red,
    }
}

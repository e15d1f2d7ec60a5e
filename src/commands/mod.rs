//! Command implementations for the gvi CLI.
//!
//! This module contains the logic behind each non-interactive command:
//! - `fetch` - One-shot reads of a single daemon resource
//! - `watch` - The headless poll loop
//! - `config show` - Resolved configuration, see [`crate::config::ResolvedConfig`]
//!
//! Every command returns a value implementing [`Output`]; `main` decides
//! between JSON and human-readable rendering.

mod fetch;
mod watch;

pub use fetch::{
    GraphOutput, HealthReport, agents, board, convoys, graph, health, issue, issues, mail,
    molecules, rigs, status, town,
};
pub use watch::{CycleLine, watch};

use crate::config::ResolvedConfig;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize `value` as a single JSON line.
pub(crate) fn json_line<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

impl Output for ResolvedConfig {
    fn to_json(&self) -> String {
        json_line(self)
    }

    fn to_human(&self) -> String {
        ResolvedConfig::to_human(self)
    }
}

//! Gas Town Viewer - a read-only dashboard for the gvid daemon.
//!
//! This library provides the core of the `gvi` CLI: the typed API client,
//! the poll loop that keeps a last-known-good snapshot of the board and the
//! town, the dashboard state machine and the derived values the terminal UI
//! renders.

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod freshness;
pub mod logging;
pub mod models;
pub mod poll;
pub mod state;
pub mod stats;
#[cfg(feature = "tui")]
pub mod tui;


/// Library-level error type for Gas Town Viewer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] client::TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Gas Town Viewer operations.
pub type Result<T> = std::result::Result<T, Error>;

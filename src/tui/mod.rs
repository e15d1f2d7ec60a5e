//! Terminal User Interface module for Gas Town Viewer
//!
//! A keyboard-driven dashboard over the gvid daemon. A background poller
//! refreshes the board and the town every few seconds; the UI loop applies
//! each cycle to the dashboard state and redraws. Logs go to a file while the
//! dashboard owns the terminal.

mod app;
mod views;

pub use app::{Action, Fetched, TuiApp, run_tui};

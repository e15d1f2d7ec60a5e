//! The dashboard's view state and its transitions.

use std::fmt;

use crate::client::TransportError;
use crate::models::Issue;
use crate::poll::CycleOutcome;

use super::Snapshot;

/// Top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Beads,
    Graph,
    Gastown,
}

impl View {
    pub const ALL: [View; 3] = [View::Beads, View::Graph, View::Gastown];

    /// The tab after this one, wrapping around.
    pub fn next(self) -> Self {
        match self {
            View::Beads => View::Graph,
            View::Graph => View::Gastown,
            View::Gastown => View::Beads,
        }
    }

    /// Zero-based position in the tab bar.
    pub fn index(self) -> usize {
        match self {
            View::Beads => 0,
            View::Graph => 1,
            View::Gastown => 2,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Beads => write!(f, "beads"),
            View::Graph => write!(f, "graph"),
            View::Gastown => write!(f, "gastown"),
        }
    }
}

/// Issue detail overlay.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    Closed,
    Open(Box<Issue>),
}

impl Overlay {
    pub fn is_open(&self) -> bool {
        matches!(self, Overlay::Open(_))
    }

    pub fn issue(&self) -> Option<&Issue> {
        match self {
            Overlay::Open(issue) => Some(issue),
            Overlay::Closed => None,
        }
    }
}

/// Whether the dashboard can show data yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    /// No cycle has completed since start or the last retry.
    #[default]
    Loading,
    /// At least one domain has loaded; later failures are silent.
    Ready,
    /// Nothing has ever loaded and the latest cycle failed everywhere.
    ConnectionError(String),
}

/// Everything the renderer needs, owned by the UI loop.
///
/// All mutation goes through the transition methods below, which do no I/O.
/// Fetching an issue or triggering a retry cycle is the caller's job; the
/// dashboard only records the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    view: View,
    overlay: Overlay,
    phase: Phase,
    snapshot: Snapshot,
    daemon_url: String,
}

impl Dashboard {
    /// Initial state: Beads tab, no overlay, loading.
    pub fn new(daemon_url: impl Into<String>) -> Self {
        Self {
            view: View::default(),
            overlay: Overlay::Closed,
            phase: Phase::Loading,
            snapshot: Snapshot::new(),
            daemon_url: daemon_url.into(),
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn daemon_url(&self) -> &str {
        &self.daemon_url
    }

    /// Switch tabs. The overlay stays as it is.
    pub fn select_view(&mut self, view: View) {
        if self.view != view {
            tracing::debug!(from = %self.view, to = %view, "view selected");
            self.view = view;
        }
    }

    pub fn next_view(&mut self) {
        self.select_view(self.view.next());
    }

    /// Show a freshly fetched issue, replacing any open one.
    pub fn open_issue(&mut self, issue: Issue) {
        tracing::debug!(id = %issue.id, "issue overlay opened");
        self.overlay = Overlay::Open(Box::new(issue));
    }

    /// Record a failed detail fetch. The overlay does not change.
    pub fn issue_fetch_failed(&mut self, id: &str, err: &TransportError) {
        tracing::warn!(id, error = %err, "failed to fetch issue detail");
    }

    /// Close the overlay. Returns whether one was open.
    pub fn close_issue(&mut self) -> bool {
        let was_open = self.overlay.is_open();
        self.overlay = Overlay::Closed;
        was_open
    }

    /// Apply one poll cycle and update the load phase.
    pub fn apply_cycle(&mut self, outcome: &CycleOutcome) {
        self.snapshot.apply(outcome);

        if self.snapshot.has_any_data() {
            if outcome.all_failed() {
                tracing::warn!(cycle = outcome.cycle, "every domain failed; showing last known data");
            }
            self.phase = Phase::Ready;
        } else if outcome.all_failed() {
            if !matches!(self.phase, Phase::ConnectionError(_)) {
                tracing::warn!(cycle = outcome.cycle, url = %self.daemon_url, "daemon unreachable");
            }
            self.phase = Phase::ConnectionError(connection_error_message(&self.daemon_url));
        }
    }

    /// Leave the error screen. Returns true when the caller should trigger a cycle.
    pub fn retry(&mut self) -> bool {
        if matches!(self.phase, Phase::ConnectionError(_)) {
            tracing::info!("retrying connection");
            self.phase = Phase::Loading;
            true
        } else {
            false
        }
    }
}

/// Message for the full-screen connection error.
pub fn connection_error_message(daemon_url: &str) -> String {
    let host = reqwest::Url::parse(daemon_url)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?.to_string();
            Some(match url.port_or_known_default() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            })
        })
        .unwrap_or_else(|| daemon_url.to_string());
    format!("Failed to connect to daemon. Is gvid running on {}?", host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poll::Domain;
    use crate::stats::board_tab_label;
    use crate::test_utils::{outcome, sample_issue, sample_town};

    const URL: &str = "http://localhost:7070/api/v1";

    #[test]
    fn test_initial_state() {
        let dash = Dashboard::new(URL);
        assert_eq!(dash.view(), View::Beads);
        assert_eq!(dash.overlay(), &Overlay::Closed);
        assert_eq!(dash.phase(), &Phase::Loading);
        assert!(!dash.snapshot().has_any_data());
    }

    #[test]
    fn test_next_view_wraps() {
        let mut dash = Dashboard::new(URL);
        dash.next_view();
        assert_eq!(dash.view(), View::Graph);
        dash.next_view();
        assert_eq!(dash.view(), View::Gastown);
        dash.next_view();
        assert_eq!(dash.view(), View::Beads);
    }

    #[test]
    fn test_partial_failure_is_ready() {
        // Board loads, town domains fail on the first cycle.
        let mut dash = Dashboard::new(URL);
        dash.apply_cycle(&outcome(1, true, false, false));
        assert_eq!(dash.phase(), &Phase::Ready);
        assert!(dash.snapshot().board().is_some());
        assert!(dash.snapshot().town().is_none());
        assert!(dash.snapshot().last_error(Domain::Town).is_some());
    }

    #[test]
    fn test_partial_failure_keeps_last_town() {
        let mut dash = Dashboard::new(URL);
        dash.apply_cycle(&outcome(1, true, true, true));
        dash.apply_cycle(&outcome(2, true, false, false));
        assert_eq!(dash.phase(), &Phase::Ready);
        assert_eq!(dash.snapshot().town(), Some(&sample_town()));
    }

    #[test]
    fn test_first_cycle_total_failure_shows_connection_error() {
        let mut dash = Dashboard::new(URL);
        dash.apply_cycle(&outcome(1, false, false, false));
        assert_eq!(
            dash.phase(),
            &Phase::ConnectionError(
                "Failed to connect to daemon. Is gvid running on localhost:7070?".to_string()
            )
        );

        assert!(dash.retry());
        assert_eq!(dash.phase(), &Phase::Loading);

        dash.apply_cycle(&outcome(2, true, true, true));
        assert_eq!(dash.phase(), &Phase::Ready);
    }

    #[test]
    fn test_retry_failing_again_returns_to_error() {
        let mut dash = Dashboard::new(URL);
        dash.apply_cycle(&outcome(1, false, false, false));
        dash.retry();
        dash.apply_cycle(&outcome(2, false, false, false));
        assert!(matches!(dash.phase(), Phase::ConnectionError(_)));
    }

    #[test]
    fn test_retry_outside_error_is_noop() {
        let mut dash = Dashboard::new(URL);
        assert!(!dash.retry());
        dash.apply_cycle(&outcome(1, true, true, true));
        assert!(!dash.retry());
        assert_eq!(dash.phase(), &Phase::Ready);
    }

    #[test]
    fn test_total_failure_after_success_is_silent() {
        let mut dash = Dashboard::new(URL);
        dash.apply_cycle(&outcome(1, true, true, true));
        dash.apply_cycle(&outcome(2, false, false, false));
        assert_eq!(dash.phase(), &Phase::Ready);
        assert!(dash.snapshot().board().is_some());
    }

    #[test]
    fn test_empty_board_is_not_an_error() {
        let mut dash = Dashboard::new(URL);
        let mut cycle = outcome(1, true, false, false);
        if let Ok(board) = cycle.board.as_mut() {
            board.columns.clear();
            board.total = 0;
        }
        dash.apply_cycle(&cycle);
        assert_eq!(dash.phase(), &Phase::Ready);
        assert_eq!(dash.snapshot().board().map(|b| b.columns.len()), Some(0));
        assert_eq!(board_tab_label(dash.snapshot().board()), "Board (0)");
    }

    #[test]
    fn test_overlay_survives_tab_switch() {
        let mut dash = Dashboard::new(URL);
        dash.select_view(View::Graph);
        dash.open_issue(sample_issue());
        dash.select_view(View::Beads);
        assert_eq!(dash.overlay().issue().map(|i| i.id.as_str()), Some("gv-1"));

        assert!(dash.close_issue());
        assert!(!dash.close_issue());
        assert_eq!(dash.view(), View::Beads);
    }

    #[test]
    fn test_issue_fetch_failure_leaves_overlay() {
        let mut dash = Dashboard::new(URL);
        let err = TransportError::Status {
            status: 404,
            url: format!("{}/issues/gv-9", URL),
        };
        dash.issue_fetch_failed("gv-9", &err);
        assert_eq!(dash.overlay(), &Overlay::Closed);

        dash.open_issue(sample_issue());
        dash.issue_fetch_failed("gv-9", &err);
        assert!(dash.overlay().is_open());
    }

    #[test]
    fn test_reapplying_cycle_is_idempotent() {
        let cycle = outcome(4, true, true, false);
        let mut once = Dashboard::new(URL);
        once.apply_cycle(&cycle);
        let mut twice = once.clone();
        twice.apply_cycle(&cycle);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_connection_error_message_without_port() {
        assert_eq!(
            connection_error_message("https://gastown.example/api/v1"),
            "Failed to connect to daemon. Is gvid running on gastown.example:443?"
        );
        assert_eq!(
            connection_error_message("garbage"),
            "Failed to connect to daemon. Is gvid running on garbage?"
        );
    }
}

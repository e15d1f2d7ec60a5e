//! The last known good data per domain.

use chrono::{DateTime, Utc};

use crate::client::TransportError;
use crate::models::{BoardResponse, Town, TownStatus};
use crate::poll::{CycleOutcome, Domain};

/// Latest value of one domain plus when it last succeeded and why it last failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSlot<T> {
    value: Option<T>,
    last_success: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl<T> Default for DomainSlot<T> {
    fn default() -> Self {
        Self {
            value: None,
            last_success: None,
            last_error: None,
        }
    }
}

impl<T: Clone> DomainSlot<T> {
    /// Apply one cycle's result. Success overwrites; failure keeps the old value.
    fn apply(&mut self, result: &Result<T, TransportError>, at: DateTime<Utc>) {
        match result {
            Ok(value) => {
                self.value = Some(value.clone());
                self.last_success = Some(at);
                self.last_error = None;
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
            }
        }
    }
}

impl<T> DomainSlot<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// Error from the most recent cycle, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Showing a value that the latest cycle failed to refresh.
    pub fn is_stale(&self) -> bool {
        self.value.is_some() && self.last_error.is_some()
    }
}

/// Client-held aggregate of the three polled domains.
///
/// Only the poll loop writes to it, through [`Snapshot::apply`]; everything
/// else reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub board: DomainSlot<BoardResponse>,
    pub town: DomainSlot<Town>,
    pub town_status: DomainSlot<TownStatus>,
    last_cycle: Option<u64>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every domain of one cycle in a single step.
    pub fn apply(&mut self, outcome: &CycleOutcome) {
        let at = outcome.finished_at;
        self.board.apply(&outcome.board, at);
        self.town.apply(&outcome.town, at);
        self.town_status.apply(&outcome.town_status, at);
        self.last_cycle = Some(outcome.cycle);
    }

    /// Whether any domain has ever loaded.
    pub fn has_any_data(&self) -> bool {
        self.board.value.is_some() || self.town.value.is_some() || self.town_status.value.is_some()
    }

    /// Sequence number of the last applied cycle.
    pub fn last_cycle(&self) -> Option<u64> {
        self.last_cycle
    }

    pub fn board(&self) -> Option<&BoardResponse> {
        self.board.value()
    }

    pub fn town(&self) -> Option<&Town> {
        self.town.value()
    }

    pub fn town_status(&self) -> Option<&TownStatus> {
        self.town_status.value()
    }

    pub fn last_error(&self, domain: Domain) -> Option<&str> {
        match domain {
            Domain::Board => self.board.last_error(),
            Domain::Town => self.town.last_error(),
            Domain::TownStatus => self.town_status.last_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{outcome, sample_board, sample_status, sample_town};

    #[test]
    fn test_new_snapshot_is_empty() {
        let snapshot = Snapshot::new();
        assert!(!snapshot.has_any_data());
        assert!(snapshot.board().is_none());
        assert!(snapshot.last_cycle().is_none());
    }

    #[test]
    fn test_success_overwrites() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(&outcome(1, true, true, true));
        assert_eq!(snapshot.board(), Some(&sample_board()));
        assert_eq!(snapshot.town(), Some(&sample_town()));
        assert_eq!(snapshot.town_status(), Some(&sample_status()));
        assert!(snapshot.board.last_success().is_some());
        assert_eq!(snapshot.last_cycle(), Some(1));

        let mut newer = outcome(2, true, true, true);
        if let Ok(board) = newer.board.as_mut() {
            board.total = 0;
            board.columns.clear();
        }
        snapshot.apply(&newer);
        assert_eq!(snapshot.board().map(|b| b.total), Some(0));
    }

    #[test]
    fn test_failure_keeps_last_value() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(&outcome(1, true, true, true));
        let first_success = snapshot.town.last_success();

        snapshot.apply(&outcome(2, true, false, false));
        assert_eq!(snapshot.town(), Some(&sample_town()));
        assert_eq!(snapshot.town_status(), Some(&sample_status()));
        assert!(snapshot.town.is_stale());
        assert!(snapshot.last_error(Domain::Town).unwrap().contains("503"));
        assert_eq!(snapshot.town.last_success(), first_success);
        assert!(!snapshot.board.is_stale());
    }

    #[test]
    fn test_success_clears_error() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(&outcome(1, false, true, true));
        assert!(snapshot.last_error(Domain::Board).is_some());
        assert!(!snapshot.board.is_stale());
        snapshot.apply(&outcome(2, true, true, true));
        assert!(snapshot.last_error(Domain::Board).is_none());
    }

    #[test]
    fn test_failure_with_nothing_loaded_stays_empty() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(&outcome(1, true, false, false));
        assert!(snapshot.town().is_none());
        assert!(snapshot.town_status().is_none());
        assert!(snapshot.has_any_data());
    }

    #[test]
    fn test_reapplying_identical_outcome_is_idempotent() {
        let cycle = outcome(3, true, false, true);
        let mut once = Snapshot::new();
        once.apply(&cycle);
        let mut twice = once.clone();
        twice.apply(&cycle);
        assert_eq!(once, twice);
    }
}

//! One poll cycle: fan out to every domain, fan in once all have settled.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::client::{DashboardSource, TransportError};
use crate::models::{BoardResponse, Town, TownStatus};

/// The independently polled data domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Board,
    Town,
    TownStatus,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Board, Domain::Town, Domain::TownStatus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Board => "board",
            Domain::Town => "town",
            Domain::TownStatus => "town_status",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settled results of one cycle, one per domain.
///
/// Applied to the snapshot as a single transition so a fast domain never
/// becomes visible ahead of a slower one from the same cycle.
#[derive(Debug)]
pub struct CycleOutcome {
    /// Sequence number assigned by the poller (1 for the startup cycle).
    pub cycle: u64,
    pub board: Result<BoardResponse, TransportError>,
    pub town: Result<Town, TransportError>,
    pub town_status: Result<TownStatus, TransportError>,
    pub finished_at: DateTime<Utc>,
}

impl CycleOutcome {
    /// Whether `domain` succeeded this cycle.
    pub fn succeeded(&self, domain: Domain) -> bool {
        match domain {
            Domain::Board => self.board.is_ok(),
            Domain::Town => self.town.is_ok(),
            Domain::TownStatus => self.town_status.is_ok(),
        }
    }

    /// The failure for `domain`, if it failed this cycle.
    pub fn error(&self, domain: Domain) -> Option<&TransportError> {
        match domain {
            Domain::Board => self.board.as_ref().err(),
            Domain::Town => self.town.as_ref().err(),
            Domain::TownStatus => self.town_status.as_ref().err(),
        }
    }

    pub fn all_failed(&self) -> bool {
        Domain::ALL.iter().all(|d| !self.succeeded(*d))
    }

    /// Serializable per-domain summary, for logs and `gvi watch`.
    pub fn summary(&self) -> CycleSummary {
        let domain = |d: Domain, count: Option<usize>| DomainSummary {
            domain: d,
            ok: self.succeeded(d),
            count,
            error: self.error(d).map(|e| e.to_string()),
        };
        CycleSummary {
            cycle: self.cycle,
            finished_at: self.finished_at,
            domains: vec![
                domain(Domain::Board, self.board.as_ref().ok().map(|b| b.total)),
                domain(Domain::Town, self.town.as_ref().ok().map(|t| t.rigs.len())),
                domain(
                    Domain::TownStatus,
                    self.town_status
                        .as_ref()
                        .ok()
                        .map(|s| s.total_agents as usize),
                ),
            ],
        }
    }
}

/// Result of one domain in a [`CycleSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSummary {
    pub domain: Domain,
    pub ok: bool,
    /// Board total, rig count or agent total, depending on the domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Compact description of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub finished_at: DateTime<Utc>,
    pub domains: Vec<DomainSummary>,
}

/// Run one cycle against `source`.
///
/// All three requests are in flight at once and every one is awaited; a
/// failure in one domain never cancels or hides the others.
pub async fn reconcile<S: DashboardSource>(source: &S, cycle: u64) -> CycleOutcome {
    let (board, town, town_status) =
        tokio::join!(source.board(), source.town(), source.town_status());

    let outcome = CycleOutcome {
        cycle,
        board,
        town,
        town_status,
        finished_at: Utc::now(),
    };

    for domain in Domain::ALL {
        if let Some(err) = outcome.error(domain) {
            tracing::debug!(cycle, domain = %domain, error = %err, "domain fetch failed");
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedSource, sample_board, sample_status, sample_town};

    #[tokio::test]
    async fn test_all_domains_succeed() {
        let source = ScriptedSource::healthy();
        let outcome = reconcile(&source, 1).await;
        assert_eq!(outcome.cycle, 1);
        assert_eq!(outcome.board.as_ref().unwrap(), &sample_board());
        assert_eq!(outcome.town.as_ref().unwrap(), &sample_town());
        assert_eq!(outcome.town_status.as_ref().unwrap(), &sample_status());
        assert!(!outcome.all_failed());
    }

    #[tokio::test]
    async fn test_one_failure_does_not_short_circuit() {
        let source = ScriptedSource::healthy();
        source.fail(Domain::Board);
        let outcome = reconcile(&source, 2).await;
        assert_eq!(outcome.error(Domain::Board).and_then(|e| e.status()), Some(503));
        assert!(outcome.town.is_ok());
        assert!(outcome.town_status.is_ok());
        assert_eq!(source.calls(Domain::Town), 1);
        assert_eq!(source.calls(Domain::TownStatus), 1);
    }

    #[tokio::test]
    async fn test_all_failed() {
        let source = ScriptedSource::down();
        let outcome = reconcile(&source, 1).await;
        assert!(outcome.all_failed());
        for domain in Domain::ALL {
            assert_eq!(source.calls(domain), 1);
        }
    }

    #[tokio::test]
    async fn test_recovered_domain_clears_error() {
        let source = ScriptedSource::healthy();
        let mut snapshot = crate::state::Snapshot::new();

        source.fail(Domain::Town);
        snapshot.apply(&reconcile(&source, 1).await);
        assert!(snapshot.last_error(Domain::Town).is_some());
        assert!(snapshot.town().is_none());

        source.recover(Domain::Town);
        snapshot.apply(&reconcile(&source, 2).await);
        assert_eq!(snapshot.last_error(Domain::Town), None);
        assert_eq!(snapshot.town(), Some(&sample_town()));
    }

    #[tokio::test]
    async fn test_summary() {
        let source = ScriptedSource::healthy();
        source.fail(Domain::TownStatus);
        let summary = reconcile(&source, 7).await.summary();
        assert_eq!(summary.cycle, 7);
        assert_eq!(summary.domains.len(), 3);
        assert!(summary.domains[0].ok);
        assert_eq!(summary.domains[0].count, Some(sample_board().total));
        assert!(!summary.domains[2].ok);
        assert!(summary.domains[2].error.as_deref().unwrap().contains("503"));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["domains"][2]["domain"], "town_status");
    }
}

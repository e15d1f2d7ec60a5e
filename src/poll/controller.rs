//! The repeating poll schedule and its lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::reconciler::{CycleOutcome, reconcile};
use crate::client::DashboardSource;

/// Default interval between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest interval accepted; anything lower would hammer the daemon.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that runs a cycle immediately and then once per interval.
///
/// Outcomes are delivered over the channel passed to [`Poller::start`]; the
/// receiver is the single owner of dashboard state. Cycles run one after
/// another inside the task, so a slow cycle pushes the next tick back instead
/// of stacking concurrent cycles.
///
/// Dropping the poller stops it. Once stopped no further outcomes are sent,
/// even if a cycle was in flight.
pub struct Poller {
    handle: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
    trigger: Arc<Notify>,
    interval: Duration,
}

impl Poller {
    /// Spawn the poll task on the current tokio runtime.
    pub fn start<S>(
        source: Arc<S>,
        interval: Duration,
        outcomes: mpsc::Sender<CycleOutcome>,
    ) -> Self
    where
        S: DashboardSource + 'static,
    {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let trigger = Arc::new(Notify::new());

        let handle = tokio::spawn(run(
            source,
            interval,
            outcomes,
            shutdown_rx,
            Arc::clone(&trigger),
        ));
        tracing::info!(interval_ms = interval.as_millis() as u64, "poller started");

        Self {
            handle,
            shutdown,
            trigger,
            interval,
        }
    }

    /// Request a cycle now instead of waiting for the next tick.
    ///
    /// The regular schedule restarts from the triggered cycle. Triggers made
    /// while a cycle is running collapse into one follow-up cycle.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// The effective interval after clamping.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop polling. Safe to call more than once.
    pub fn stop(&self) {
        if self.shutdown.send(true).is_ok() {
            tracing::info!("poller stopped");
        }
        self.handle.abort();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<S>(
    source: Arc<S>,
    interval: Duration,
    outcomes: mpsc::Sender<CycleOutcome>,
    mut shutdown: watch::Receiver<bool>,
    trigger: Arc<Notify>,
) where
    S: DashboardSource + 'static,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycle: u64 = 0;

    loop {
        // The first tick completes immediately, giving the startup cycle.
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = trigger.notified() => {}
            _ = ticker.tick() => {}
        }

        cycle += 1;
        let outcome = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            outcome = reconcile(source.as_ref(), cycle) => outcome,
        };

        if *shutdown.borrow() {
            break;
        }
        // The next tick is a full interval after this cycle finished.
        ticker.reset();
        if outcomes.send(outcome).await.is_err() {
            tracing::debug!("outcome receiver dropped; stopping poller");
            break;
        }
    }
}

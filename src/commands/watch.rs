//! `gvi watch`: the poll loop without a terminal UI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{Output, json_line};
use crate::Result;
use crate::client::DashboardSource;
use crate::poll::{CycleSummary, Poller};

/// One printed line per completed cycle.
#[derive(Debug, Clone)]
pub struct CycleLine(pub CycleSummary);

impl Output for CycleLine {
    fn to_json(&self) -> String {
        json_line(&self.0)
    }

    fn to_human(&self) -> String {
        let mut line = format!(
            "cycle {} at {}",
            self.0.cycle,
            self.0.finished_at.format("%H:%M:%S")
        );
        for domain in &self.0.domains {
            match (&domain.error, domain.count) {
                (Some(err), _) => line.push_str(&format!("  {} failed: {}", domain.domain, err)),
                (None, Some(count)) => line.push_str(&format!("  {} ok ({})", domain.domain, count)),
                (None, None) => line.push_str(&format!("  {} ok", domain.domain)),
            }
        }
        line
    }
}

/// Poll `source` and write one line per cycle to `out`.
///
/// Runs until `cycles` cycles have been written, Ctrl-C, or the poller ends.
/// Returns the number of cycles written.
pub async fn watch<S, W>(
    source: Arc<S>,
    interval: Duration,
    cycles: Option<u64>,
    human: bool,
    out: &mut W,
) -> Result<u64>
where
    S: DashboardSource + 'static,
    W: Write,
{
    let (tx, mut rx) = mpsc::channel(4);
    let poller = Poller::start(source, interval, tx);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut written = 0;
    loop {
        if cycles.is_some_and(|limit| written >= limit) {
            break;
        }
        tokio::select! {
            outcome = rx.recv() => {
                let Some(outcome) = outcome else { break };
                let line = CycleLine(outcome.summary());
                let text = if human { line.to_human() } else { line.to_json() };
                writeln!(out, "{}", text)?;
                out.flush()?;
                written += 1;
            }
            _ = &mut ctrl_c => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    poller.stop();
    Ok(written)
}

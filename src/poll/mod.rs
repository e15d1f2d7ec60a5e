//! Periodic fetching of the dashboard's three data domains.
//!
//! - [`reconciler`] runs one cycle: board, town and town status fetched
//!   concurrently, every result settled, none short-circuiting the others.
//! - [`controller`] owns the repeating schedule: one cycle immediately, then
//!   one per interval until stopped.

pub mod controller;
pub mod reconciler;

pub use controller::{DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL, Poller};
pub use reconciler::{CycleOutcome, CycleSummary, Domain, DomainSummary, reconcile};

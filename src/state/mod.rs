//! Client-side dashboard state.
//!
//! [`Snapshot`] keeps the last known good value of each polled domain.
//! [`Dashboard`] wraps it with the selected tab, the issue overlay and the
//! load phase, and is the only thing the renderer reads.

mod dashboard;
mod snapshot;

pub use dashboard::{Dashboard, Overlay, Phase, View, connection_error_message};
pub use snapshot::{DomainSlot, Snapshot};

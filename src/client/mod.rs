//! Transport client for the gvid REST API.
//!
//! One request function per resource lives on [`ApiClient`]. Every failure,
//! whether connection, non-2xx status or a body that does not match the
//! expected shape, surfaces as a [`TransportError`]. Retry policy belongs to
//! the poller, not here.
//!
//! The poller and the TUI depend on [`DashboardSource`] rather than on the HTTP
//! client directly so tests can substitute scripted sources.

mod http;

use std::future::Future;

use crate::models::{BoardResponse, GraphResponse, Issue, Town, TownStatus};

pub use http::ApiClient;

/// Base URL of a locally running gvid daemon.
pub const DEFAULT_BASE_URL: &str = "http://localhost:7070/api/v1";

/// Uniform failure for a single request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TransportError {
    /// HTTP status code, when the daemon answered with a non-2xx status.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 from the daemon.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// The resources the dashboard polls or fetches on demand.
pub trait DashboardSource: Send + Sync {
    fn board(&self) -> impl Future<Output = Result<BoardResponse, TransportError>> + Send;

    fn town(&self) -> impl Future<Output = Result<Town, TransportError>> + Send;

    fn town_status(&self) -> impl Future<Output = Result<TownStatus, TransportError>> + Send;

    /// Single issue detail for the overlay.
    fn issue(&self, id: &str) -> impl Future<Output = Result<Issue, TransportError>> + Send;

    /// Dependency graph for the Graph tab.
    fn graph(&self) -> impl Future<Output = Result<GraphResponse, TransportError>> + Send;
}

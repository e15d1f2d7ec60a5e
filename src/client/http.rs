//! reqwest-backed implementation of the transport client.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use super::{DashboardSource, TransportError};
use crate::models::{
    AgentsResponse, BoardResponse, Convoy, ConvoysResponse, GraphResponse, HealthResponse, Issue,
    IssueFilter, IssueListResponse, MailResponse, Molecule, MoleculesResponse, Rig, RigsResponse,
    Town, TownStatus,
};

/// HTTP client bound to one daemon base URL (e.g. `http://localhost:7070/api/v1`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for `base_url`. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let invalid = |reason: String| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) URL".to_string()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request {
                url: base_url.to_string(),
                source: e,
            })?;

        Ok(Self { http, base })
    }

    /// The base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Build an endpoint URL by appending path segments to the base.
    ///
    /// Each segment is percent-encoded on its own, so ids containing `/` or
    /// spaces stay a single segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidUrl {
                url: self.base.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Perform a GET and reject non-2xx statuses.
    async fn get(&self, url: Url) -> Result<Response, TransportError> {
        tracing::debug!(url = %url, "GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "non-success status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// GET and decode the body against `T`.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let response = self.get(url.clone()).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                source: e,
            })?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            source: e,
        })
    }

    pub async fn health(&self) -> Result<HealthResponse, TransportError> {
        self.get_json(self.endpoint(&["health"])?).await
    }

    pub async fn board(&self) -> Result<BoardResponse, TransportError> {
        self.get_json(self.endpoint(&["board"])?).await
    }

    pub async fn issues(&self, filter: &IssueFilter) -> Result<IssueListResponse, TransportError> {
        let mut url = self.endpoint(&["issues"])?;
        url.query_pairs_mut().extend_pairs(filter.query_pairs());
        self.get_json(url).await
    }

    pub async fn issue(&self, id: &str) -> Result<Issue, TransportError> {
        self.get_json(self.endpoint(&["issues", id])?).await
    }

    pub async fn graph_json(&self) -> Result<GraphResponse, TransportError> {
        let mut url = self.endpoint(&["graph"])?;
        url.query_pairs_mut().append_pair("format", "json");
        self.get_json(url).await
    }

    /// The graph in Graphviz DOT format, returned as text.
    pub async fn graph_dot(&self) -> Result<String, TransportError> {
        let mut url = self.endpoint(&["graph"])?;
        url.query_pairs_mut().append_pair("format", "dot");
        let response = self.get(url.clone()).await?;
        response.text().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            source: e,
        })
    }

    pub async fn town(&self) -> Result<Town, TransportError> {
        self.get_json(self.endpoint(&["town"])?).await
    }

    pub async fn town_status(&self) -> Result<TownStatus, TransportError> {
        self.get_json(self.endpoint(&["town", "status"])?).await
    }

    pub async fn rigs(&self) -> Result<RigsResponse, TransportError> {
        self.get_json(self.endpoint(&["town", "rigs"])?).await
    }

    pub async fn rig(&self, name: &str) -> Result<Rig, TransportError> {
        self.get_json(self.endpoint(&["town", "rigs", name])?).await
    }

    pub async fn agents(&self) -> Result<AgentsResponse, TransportError> {
        self.get_json(self.endpoint(&["town", "agents"])?).await
    }

    pub async fn convoys(&self) -> Result<ConvoysResponse, TransportError> {
        self.get_json(self.endpoint(&["town", "convoys"])?).await
    }

    pub async fn convoy(&self, id: &str) -> Result<Convoy, TransportError> {
        self.get_json(self.endpoint(&["town", "convoys", id])?).await
    }

    pub async fn molecules(&self) -> Result<MoleculesResponse, TransportError> {
        self.get_json(self.endpoint(&["town", "molecules"])?).await
    }

    pub async fn molecule(&self, id: &str) -> Result<Molecule, TransportError> {
        self.get_json(self.endpoint(&["town", "molecules", id])?).await
    }

    pub async fn mail(&self, address: &str) -> Result<MailResponse, TransportError> {
        self.get_json(self.endpoint(&["town", "mail", address])?).await
    }
}

impl DashboardSource for ApiClient {
    async fn board(&self) -> Result<BoardResponse, TransportError> {
        ApiClient::board(self).await
    }

    async fn town(&self) -> Result<Town, TransportError> {
        ApiClient::town(self).await
    }

    async fn town_status(&self) -> Result<TownStatus, TransportError> {
        ApiClient::town_status(self).await
    }

    async fn issue(&self, id: &str) -> Result<Issue, TransportError> {
        ApiClient::issue(self, id).await
    }

    async fn graph(&self) -> Result<GraphResponse, TransportError> {
        self.graph_json().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let c = client("http://localhost:7070/api/v1");
        assert_eq!(
            c.endpoint(&["town", "status"]).unwrap().as_str(),
            "http://localhost:7070/api/v1/town/status"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let c = client("http://localhost:7070/api/v1/");
        assert_eq!(
            c.endpoint(&["board"]).unwrap().as_str(),
            "http://localhost:7070/api/v1/board"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let c = client("http://localhost:7070/api/v1");
        assert_eq!(
            c.endpoint(&["issues", "gv 1/a?b"]).unwrap().as_str(),
            "http://localhost:7070/api/v1/issues/gv%201%2Fa%3Fb"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        assert!(matches!(
            ApiClient::new("mailto:mayor@gastown", Duration::from_secs(1)),
            Err(TransportError::InvalidUrl { .. })
        ));
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(TransportError::InvalidUrl { .. })
        ));
    }
}

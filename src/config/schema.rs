//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and loading from disk

use std::path::Path;

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::Serialize;

use crate::{Error, Result};

/// Log levels accepted by `log-level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// User preferences stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// base-url "http://localhost:7070/api/v1"
/// poll-interval-secs 5
/// request-timeout-secs 10
/// log-level "info"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewerConfig {
    /// Base URL of the gvid API, including the `/api/v1` prefix
    pub base_url: Option<String>,

    /// Seconds between poll cycles
    pub poll_interval_secs: Option<u64>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,

    /// Default tracing level when `GVI_LOG` is not set
    pub log_level: Option<String>,
}

impl ViewerConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(ref url) = self.base_url {
            validate_base_url(url)?;
        }
        if self.poll_interval_secs == Some(0) {
            return Err("poll-interval-secs must be at least 1".to_string());
        }
        if self.request_timeout_secs == Some(0) {
            return Err("request-timeout-secs must be at least 1".to_string());
        }
        if let Some(ref level) = self.log_level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(format!(
                    "log-level must be one of {}, got '{}'",
                    LOG_LEVELS.join(", "),
                    level
                ));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. Negative integers are dropped.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "base-url") {
            config.base_url = Some(s.to_string());
        }
        if let Some(i) = first_integer(doc, "poll-interval-secs") {
            config.poll_interval_secs = u64::try_from(i).ok();
        }
        if let Some(i) = first_integer(doc, "request-timeout-secs") {
            config.request_timeout_secs = u64::try_from(i).ok();
        }
        if let Some(s) = first_string(doc, "log-level") {
            config.log_level = Some(s.to_lowercase());
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref url) = self.base_url {
            let mut node = KdlNode::new("base-url");
            node.push(KdlEntry::new(KdlValue::String(url.clone())));
            doc.nodes_mut().push(node);
        }

        if let Some(secs) = self.poll_interval_secs {
            let mut node = KdlNode::new("poll-interval-secs");
            node.push(KdlEntry::new(KdlValue::Integer(secs as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(secs) = self.request_timeout_secs {
            let mut node = KdlNode::new("request-timeout-secs");
            node.push(KdlEntry::new(KdlValue::Integer(secs as i128)));
            doc.nodes_mut().push(node);
        }

        if let Some(ref level) = self.log_level {
            let mut node = KdlNode::new("log-level");
            node.push(KdlEntry::new(KdlValue::String(level.clone())));
            doc.nodes_mut().push(node);
        }

        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &ViewerConfig) {
        if other.base_url.is_some() {
            self.base_url = other.base_url.clone();
        }
        if other.poll_interval_secs.is_some() {
            self.poll_interval_secs = other.poll_interval_secs;
        }
        if other.request_timeout_secs.is_some() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level.clone();
        }
    }

    /// Load and validate config.kdl at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;

        let config = Self::from_kdl(&doc);
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Check that `url` is an absolute http(s) URL.
pub fn validate_base_url(url: &str) -> std::result::Result<(), String> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(format!(
            "base-url must use http or https, got '{}'",
            parsed.scheme()
        )),
        Err(e) => Err(format!("base-url '{}' is not a valid URL: {}", url, e)),
    }
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn first_integer(doc: &KdlDocument, name: &str) -> Option<i128> {
    doc.get(name)?.entries().first()?.value().as_integer()
}

//! Precedence resolution for viewer configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`GVI_URL`)
//! 3. config.kdl (`--config`, `GVI_CONFIG`, or `~/.config/gastown-viewer/config.kdl`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Serialize, Serializer};

use super::schema::{ViewerConfig, validate_base_url};
use crate::client::DEFAULT_BASE_URL;
use crate::poll::DEFAULT_POLL_INTERVAL;
use crate::{Error, Result};

/// Environment variable overriding the daemon base URL.
pub const URL_ENV: &str = "GVI_URL";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GVI_CONFIG";

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default log level when neither config nor `GVI_LOG` set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from a config.kdl file
    File(PathBuf),
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File(path) => write!(f, "file:{}", path.display()),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// The config file that was read, if any
    pub config_path: Option<PathBuf>,
    pub base_url: Resolved<String>,
    pub poll_interval_secs: Resolved<u64>,
    pub request_timeout_secs: Resolved<u64>,
    pub log_level: Resolved<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            base_url: Resolved::new(DEFAULT_BASE_URL.to_string(), ValueSource::Default),
            poll_interval_secs: Resolved::new(DEFAULT_POLL_INTERVAL.as_secs(), ValueSource::Default),
            request_timeout_secs: Resolved::new(
                DEFAULT_REQUEST_TIMEOUT_SECS,
                ValueSource::Default,
            ),
            log_level: Resolved::new(DEFAULT_LOG_LEVEL.to_string(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url.value
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.value)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.value)
    }

    pub fn log_level(&self) -> &str {
        &self.log_level.value
    }

    /// Human-readable listing, one `key = value (source)` line per setting.
    pub fn to_human(&self) -> String {
        let mut lines = vec![match self.config_path {
            Some(ref path) => format!("config file: {}", path.display()),
            None => "config file: (none)".to_string(),
        }];
        lines.push(format!(
            "base-url = {} ({})",
            self.base_url.value, self.base_url.source
        ));
        lines.push(format!(
            "poll-interval-secs = {} ({})",
            self.poll_interval_secs.value, self.poll_interval_secs.source
        ));
        lines.push(format!(
            "request-timeout-secs = {} ({})",
            self.request_timeout_secs.value, self.request_timeout_secs.source
        ));
        lines.push(format!(
            "log-level = {} ({})",
            self.log_level.value, self.log_level.source
        ));
        lines.join("\n")
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Explicit config file (`--config` or `GVI_CONFIG`)
    pub config_path: Option<PathBuf>,
    /// Base URL override from `--url`
    pub base_url: Option<String>,
    /// Poll interval override from `--interval`
    pub poll_interval_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file override.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set base URL override.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set poll interval override.
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = Some(secs);
        self
    }
}

/// Default location of config.kdl.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gastown-viewer").join("config.kdl"))
}

/// Resolve configuration from the process environment and disk.
///
/// An explicit config path must exist. The default path is optional.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let (file, path) = match overrides.config_path {
        Some(ref path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            (ViewerConfig::load(path)?, Some(path.clone()))
        }
        None => match default_config_path() {
            Some(path) if path.exists() => (ViewerConfig::load(&path)?, Some(path)),
            _ => (ViewerConfig::new(), None),
        },
    };

    let env_url = std::env::var(URL_ENV).ok().filter(|v| !v.is_empty());
    resolve_with(overrides, &file, path.as_deref(), env_url)
}

/// Resolve from already-loaded sources.
///
/// `file` is the parsed config.kdl found at `path`; `env_url` is the value of
/// `GVI_URL`, if set.
pub fn resolve_with(
    overrides: &ConfigOverrides,
    file: &ViewerConfig,
    path: Option<&Path>,
    env_url: Option<String>,
) -> Result<ResolvedConfig> {
    let mut result = ResolvedConfig {
        config_path: path.map(Path::to_path_buf),
        ..Default::default()
    };
    let from_file = || ValueSource::File(path.map(Path::to_path_buf).unwrap_or_default());

    // Resolve base_url
    if let Some(ref url) = overrides.base_url {
        result.base_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    } else if let Some(url) = env_url {
        result.base_url = Resolved::new(url, ValueSource::EnvVar(URL_ENV.to_string()));
    } else if let Some(ref url) = file.base_url {
        result.base_url = Resolved::new(url.clone(), from_file());
    }
    validate_base_url(&result.base_url.value).map_err(|e| {
        Error::InvalidInput(format!("{} (from {})", e, result.base_url.source))
    })?;

    // Resolve poll_interval_secs
    if let Some(secs) = overrides.poll_interval_secs {
        if secs == 0 {
            return Err(Error::InvalidInput(
                "--interval must be at least 1 second".to_string(),
            ));
        }
        result.poll_interval_secs = Resolved::new(secs, ValueSource::CliFlag);
    } else if let Some(secs) = file.poll_interval_secs {
        result.poll_interval_secs = Resolved::new(secs, from_file());
    }

    if let Some(secs) = file.request_timeout_secs {
        result.request_timeout_secs = Resolved::new(secs, from_file());
    }

    if let Some(ref level) = file.log_level {
        result.log_level = Resolved::new(level.clone(), from_file());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn file_config() -> ViewerConfig {
        ViewerConfig {
            base_url: Some("http://file-host:7070/api/v1".to_string()),
            poll_interval_secs: Some(9),
            request_timeout_secs: Some(3),
            log_level: Some("debug".to_string()),
        }
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(
            format!("{}", ValueSource::EnvVar("GVI_URL".to_string())),
            "env:GVI_URL"
        );
        assert_eq!(
            format!("{}", ValueSource::File(PathBuf::from("/etc/gvi/config.kdl"))),
            "file:/etc/gvi/config.kdl"
        );
        assert_eq!(format!("{}", ValueSource::CliFlag), "cli");
        assert_eq!(format!("{}", ValueSource::Default), "default");
    }

    #[test]
    fn test_resolve_defaults() {
        let config =
            resolve_with(&ConfigOverrides::new(), &ViewerConfig::new(), None, None).unwrap();
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.base_url.source, ValueSource::Default);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_level(), "info");
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_file_beats_default() {
        let path = Path::new("/tmp/gvi/config.kdl");
        let config =
            resolve_with(&ConfigOverrides::new(), &file_config(), Some(path), None).unwrap();
        assert_eq!(config.base_url(), "http://file-host:7070/api/v1");
        assert_eq!(config.base_url.source, ValueSource::File(path.to_path_buf()));
        assert_eq!(config.poll_interval_secs.value, 9);
        assert_eq!(config.request_timeout_secs.value, 3);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_env_beats_file() {
        let config = resolve_with(
            &ConfigOverrides::new(),
            &file_config(),
            Some(Path::new("/tmp/config.kdl")),
            Some("http://env-host:7070/api/v1".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://env-host:7070/api/v1");
        assert_eq!(
            config.base_url.source,
            ValueSource::EnvVar("GVI_URL".to_string())
        );
    }

    #[test]
    fn test_cli_beats_everything() {
        let overrides = ConfigOverrides::new()
            .with_base_url("http://cli-host:7070/api/v1")
            .with_poll_interval_secs(2);
        let config = resolve_with(
            &overrides,
            &file_config(),
            Some(Path::new("/tmp/config.kdl")),
            Some("http://env-host:7070/api/v1".to_string()),
        )
        .unwrap();
        assert_eq!(config.base_url(), "http://cli-host:7070/api/v1");
        assert_eq!(config.base_url.source, ValueSource::CliFlag);
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.poll_interval_secs.source, ValueSource::CliFlag);
    }

    #[test]
    fn test_invalid_url_names_its_source() {
        let overrides = ConfigOverrides::new().with_base_url("localhost:7070");
        let err = resolve_with(&overrides, &ViewerConfig::new(), None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("(from cli)"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let overrides = ConfigOverrides::new().with_poll_interval_secs(0);
        assert!(resolve_with(&overrides, &ViewerConfig::new(), None, None).is_err());
    }

    #[test]
    fn test_to_human_lists_sources() {
        let config =
            resolve_with(&ConfigOverrides::new(), &ViewerConfig::new(), None, None).unwrap();
        let human = config.to_human();
        assert!(human.contains("config file: (none)"));
        assert!(human.contains("base-url = http://localhost:7070/api/v1 (default)"));
    }

    #[test]
    fn test_serializes_sources_as_strings() {
        let overrides = ConfigOverrides::new().with_base_url("http://cli:1/api/v1");
        let config = resolve_with(&overrides, &ViewerConfig::new(), None, None).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["base_url"]["source"], "cli");
        assert_eq!(json["poll_interval_secs"]["value"], 5);
    }

    #[test]
    #[serial]
    fn test_resolve_config_reads_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.kdl");
        std::fs::write(&path, "base-url \"http://disk:7070/api/v1\"\n").unwrap();

        let overrides = ConfigOverrides::new().with_config_path(&path);
        // SAFETY: serialized with the other env-touching tests.
        unsafe { std::env::remove_var(URL_ENV) };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.base_url(), "http://disk:7070/api/v1");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    #[serial]
    fn test_resolve_config_missing_explicit_file() {
        let overrides = ConfigOverrides::new().with_config_path("/nonexistent/gvi/config.kdl");
        let err = resolve_config(&overrides).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}

//! Configuration for the viewer.
//!
//! ## config.kdl - User preferences
//!
//! Located at `--config`, `$GVI_CONFIG`, or `~/.config/gastown-viewer/config.kdl`.
//!
//! Contains:
//! - `base-url` - gvid API base URL
//! - `poll-interval-secs` - seconds between poll cycles (minimum 1)
//! - `request-timeout-secs` - per-request timeout
//! - `log-level` - default tracing level
//!
//! ## Precedence
//!
//! CLI flag > environment variable > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_ENV, ConfigOverrides, DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS, Resolved,
    ResolvedConfig, URL_ENV, ValueSource, default_config_path, resolve_config, resolve_with,
};
pub use schema::{LOG_LEVELS, ViewerConfig, validate_base_url};

//! # Logging
//!
//! Structured logging for the generator and the client runtime, built on
//! `tracing-subscriber`.
//!
//! ## Environment Variables
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `WSGEN_LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error` | `warn` |
//! | `WSGEN_LOG_FORMAT` | `json`, `pretty` | `pretty` |
//! | `WSGEN_LOG_TARGET_FILTER` | comma-separated `EnvFilter` directives | none |
//! | `WSGEN_LOG_INCLUDE_LOCATION` | `true`, `false` | `false` |
//!
//! `RUST_LOG`, when set, replaces `WSGEN_LOG_LEVEL`. Target directives are
//! added on top of either, e.g. `asyncapi_wsgen::runtime=debug`.
//!
//! Logs go to stderr so generated output and CLI summaries on stdout stay
//! clean.
//!
//! ```rust,no_run
//! use asyncapi_wsgen::logging::{init_logging_with_config, LogConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! init_logging_with_config(&LogConfig::from_env())?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::env;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const ENV_LOG_LEVEL: &str = "WSGEN_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "WSGEN_LOG_FORMAT";
pub const ENV_LOG_TARGET_FILTER: &str = "WSGEN_LOG_TARGET_FILTER";
pub const ENV_LOG_INCLUDE_LOCATION: &str = "WSGEN_LOG_INCLUDE_LOCATION";

/// Log format: JSON for machines, pretty-print for terminals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Extra `EnvFilter` directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line in every event
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            format: lookup(ENV_LOG_FORMAT)
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            target_filter: lookup(ENV_LOG_TARGET_FILTER).filter(|s| !s.trim().is_empty()),
            include_location: lookup(ENV_LOG_INCLUDE_LOCATION)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Verbose configuration for local debugging
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            target_filter: None,
            include_location: true,
        }
    }

    pub fn level(&self) -> Level {
        match self.log_level.trim().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

/// Build the event filter: `RUST_LOG` or the configured level, plus the
/// configured target directives. Directives that fail to parse are returned
/// alongside the filter.
pub fn build_env_filter(config: &LogConfig) -> (EnvFilter, Vec<String>) {
    let mut env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level().as_str()));
    let mut rejected = Vec::new();

    if let Some(target_filter) = &config.target_filter {
        for filter in target_filter.split(',') {
            let filter = filter.trim();
            if filter.is_empty() {
                continue;
            }
            match filter.parse() {
                Ok(directive) => env_filter = env_filter.add_directive(directive),
                Err(_) => rejected.push(filter.to_string()),
            }
        }
    }
    (env_filter, rejected)
}

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let (env_filter, rejected) = build_env_filter(config);

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_span_list(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;

    for directive in rejected {
        tracing::warn!(%directive, "ignoring invalid log filter directive");
    }
    Ok(())
}

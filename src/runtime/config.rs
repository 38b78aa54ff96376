//! Environment-driven client configuration.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `WSGEN_HANDSHAKE_TIMEOUT_MS` | how long `connect` waits for the handshake | `5000` |
//! | `WSGEN_RECONNECT_DELAY_MS` | pause before each reconnection attempt | `5000` |
//! | `WSGEN_MAX_RECONNECT_ATTEMPTS` | consecutive failed attempts before giving up | unlimited |
//! | `WSGEN_ACCEPT_INVALID_CERTS` | skip server certificate checks on `wss://` (`true`/`1`/`yes`) | `false` |
//!
//! Unparsable values fall back to the default.

use std::env;
use std::time::Duration;

pub const ENV_HANDSHAKE_TIMEOUT_MS: &str = "WSGEN_HANDSHAKE_TIMEOUT_MS";
pub const ENV_RECONNECT_DELAY_MS: &str = "WSGEN_RECONNECT_DELAY_MS";
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "WSGEN_MAX_RECONNECT_ATTEMPTS";
pub const ENV_ACCEPT_INVALID_CERTS: &str = "WSGEN_ACCEPT_INVALID_CERTS";

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Timing and retry settings of a [`WsClient`](super::WsClient).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bound on the wait in `connect` for the handshake to complete
    pub handshake_timeout: Duration,
    /// Sleep between an unexpected close and the next connection attempt
    pub reconnect_delay: Duration,
    /// Consecutive failed reconnection attempts tolerated; `None` retries forever
    pub max_reconnect_attempts: Option<u32>,
    /// Accept any server certificate on `wss://`, for devices with self-signed ones
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            max_reconnect_attempts: None,
            accept_invalid_certs: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let millis = |key: &str| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
        };
        Self {
            handshake_timeout: millis(ENV_HANDSHAKE_TIMEOUT_MS)
                .unwrap_or(defaults.handshake_timeout),
            reconnect_delay: millis(ENV_RECONNECT_DELAY_MS).unwrap_or(defaults.reconnect_delay),
            max_reconnect_attempts: lookup(ENV_MAX_RECONNECT_ATTEMPTS)
                .and_then(|v| v.trim().parse::<u32>().ok()),
            accept_invalid_certs: lookup(ENV_ACCEPT_INVALID_CERTS)
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.accept_invalid_certs),
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.max_reconnect_attempts, None);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_HANDSHAKE_TIMEOUT_MS, "250"),
            (ENV_RECONNECT_DELAY_MS, " 100 "),
            (ENV_MAX_RECONNECT_ATTEMPTS, "3"),
            (ENV_ACCEPT_INVALID_CERTS, "TRUE"),
        ]));
        assert_eq!(config.handshake_timeout, Duration::from_millis(250));
        assert_eq!(config.reconnect_delay, Duration::from_millis(100));
        assert_eq!(config.max_reconnect_attempts, Some(3));
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_HANDSHAKE_TIMEOUT_MS, "soon"),
            (ENV_RECONNECT_DELAY_MS, "-1"),
            (ENV_MAX_RECONNECT_ATTEMPTS, "many"),
            (ENV_ACCEPT_INVALID_CERTS, "perhaps"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_handshake_timeout(Duration::from_millis(10))
            .with_reconnect_delay(Duration::from_millis(20))
            .with_max_reconnect_attempts(Some(1))
            .with_accept_invalid_certs(true);
        assert_eq!(config.handshake_timeout, Duration::from_millis(10));
        assert_eq!(config.reconnect_delay, Duration::from_millis(20));
        assert_eq!(config.max_reconnect_attempts, Some(1));
        assert!(config.accept_invalid_certs);
    }
}

//! # Runtime Module
//!
//! The runtime every generated client is built on. A generated client is a
//! thin typed wrapper around [`WsClient`]: one `send_*` method and one `on_*`
//! registration method per message, all routed through the envelope
//!
//! ```json
//! {"type": "GpioMessage", "payload": {"status": "high"}}
//! ```
//!
//! ## Lifecycle
//!
//! [`WsClient::connect`] spawns a tokio task that performs the handshake and
//! then reads frames until the connection ends. `connect` waits on a one-shot
//! signal from that task, bounded by [`ClientConfig::handshake_timeout`].
//! With auto-reconnect enabled, any close not requested through
//! [`WsClient::disconnect`] moves the client to
//! [`ConnectionState::Reconnecting`]; after [`ClientConfig::reconnect_delay`]
//! the task checks the flag again and retries.
//!
//! ## Failure handling
//!
//! Nothing that happens on an open connection tears it down:
//!
//! - undecodable frames are logged and dropped
//! - frames without a handler are dropped
//! - a handler returning `Err` or panicking is logged, later handlers still run
//! - failed sends return `false`
//!
//! Only transport failures (handshake errors, read errors) reach the handlers
//! registered with [`WsClient::register_error_handler`].
//!
//! ## TLS
//!
//! `wss://` endpoints are verified against the platform's root certificates.
//! Devices with self-signed certificates need
//! [`ClientConfig::accept_invalid_certs`] (`WSGEN_ACCEPT_INVALID_CERTS`).

mod client;
mod config;
mod envelope;
mod registry;
mod state;
mod tls;

pub use crate::error::ClientError;
pub use client::WsClient;
pub use config::*;
pub use envelope::*;
pub use registry::*;
pub use state::ConnectionState;

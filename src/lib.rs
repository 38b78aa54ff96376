//! # asyncapi-wsgen
//!
//! Generates typed Rust WebSocket clients from
//! [AsyncAPI 3](https://www.asyncapi.com/docs/reference/specification/v3.0.0)
//! specifications, and ships the runtime those clients run on.
//!
//! ## Overview
//!
//! The crate has two halves:
//!
//! - **Generator** - reads a specification ([`spec`]), maps its schemas to Rust
//!   types and renders a client crate ([`generator`]). Driven by the
//!   `asyncapi-wsgen` binary ([`cli`]).
//! - **Runtime** - [`runtime::WsClient`], the connection object every generated
//!   client wraps: envelope encoding, handler dispatch, error handlers and
//!   reconnection on tokio and `tokio-tungstenite`.
//!
//! ### Code Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(asyncapi-wsgen)
//!     participant Spec as spec::load_spec
//!     participant Model as generator::ClientModel
//!     participant Templates as generator::templates
//!     participant FS as File System
//!
//!     User->>CLI: asyncapi-wsgen asyncapi.yaml -o gpio-client
//!     CLI->>Spec: load_spec("asyncapi.yaml")
//!     Spec-->>CLI: SpecDocument
//!     CLI->>Model: ClientModel::build(&doc)
//!     Model->>Model: Name types and methods<br/>resolve schema references
//!     Model-->>CLI: ClientModel + resolution failures
//!     CLI->>Templates: render client.rs, main.rs, Cargo.toml, ...
//!     Templates-->>CLI: GeneratedArtifact
//!     CLI->>FS: write_artifact(output_dir)
//! ```
//!
//! ### Wire Protocol
//!
//! Every enveloped frame is a JSON text frame:
//!
//! ```json
//! {"type": "GpioMessage", "payload": {"pin": 17, "status": "high"}}
//! ```
//!
//! Inbound frames are routed to the handlers registered for `type`.
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin asyncapi-wsgen -- demos/gpio.json --output gpio-client
//! cd gpio-client && cargo run
//! ```
//!
//! ## Logging
//!
//! All components log through `tracing`; see [`logging`] for the
//! `WSGEN_LOG_*` variables.

pub mod cli;
pub mod error;
pub mod generator;
pub mod ids;
pub mod logging;
pub mod runtime;
pub mod spec;

pub use error::{ClientError, ResolutionFailure, SpecError, SpecWarning};
pub use generator::{generate_client, render_client, GenerateOptions, GeneratedArtifact};
pub use ids::ConnectionId;
pub use runtime::{ClientConfig, ConnectionState, WsClient};
pub use spec::{load_spec, SpecDocument};

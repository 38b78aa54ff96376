//! # Generator Module
//!
//! Turns a loaded AsyncAPI document into a Rust client crate.
//!
//! ## Pipeline
//!
//! ```text
//! SpecDocument → ClientModel → Askama templates → GeneratedArtifact → files
//! ```
//!
//! 1. **Naming** ([`to_pascal_case`], [`to_snake_case`], [`to_kebab_case`],
//!    [`enum_constant_name`]) derives every output identifier from the
//!    declared names.
//! 2. **Type mapping** ([`TypeMapper`]) resolves schemas to Rust types. A
//!    reference that cannot be resolved degrades to `serde_json::Value` and
//!    is recorded, never fatal.
//! 3. **Model** ([`ClientModel`]) collects enums, records and messages with
//!    their derived names.
//! 4. **Emission** renders the templates under `templates/` in a fixed order:
//!    enums, records, the client type, then one `send_*`/`on_*` pair per
//!    message grouped by channel.
//!
//! Rendering is deterministic: the same document always yields byte-identical
//! files.
//!
//! ## Generated Structure
//!
//! ```text
//! generated-client/
//! ├── Cargo.toml
//! ├── README.md
//! ├── rustfmt.toml
//! └── src/
//!     ├── lib.rs
//!     ├── client.rs   # types, MESSAGE_NAMES and the client
//!     └── main.rs     # example binary
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use asyncapi_wsgen::generator::{generate_client, GenerateOptions};
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let artifact = generate_client(Path::new("demos/gpio.json"), &GenerateOptions::default())?;
//! println!("generated {}", artifact.client_name());
//! # Ok(())
//! # }
//! ```

mod model;
mod naming;
mod project;
mod schema;
mod templates;

pub use model::*;
pub use naming::*;
pub use project::*;
pub use schema::*;
pub use templates::*;

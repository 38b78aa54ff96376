//! # Spec Module
//!
//! Loads AsyncAPI 3 documents (JSON or YAML) into a [`SpecDocument`]: title,
//! description, default server, component schemas and channels with their
//! messages, all in declaration order.
//!
//! Schemas are described structurally ([`SchemaDescriptor`]); references are
//! kept by name and resolved later by the generator's type mapper.

mod load;
mod schema;
mod types;

pub use load::*;
pub use schema::*;
pub use types::*;

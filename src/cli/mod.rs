//! # CLI Module
//!
//! Command-line front end of the generator, available as the `asyncapi-wsgen`
//! binary.
//!
//! ```bash
//! asyncapi-wsgen asyncapi.yaml --output gpio-client
//! ```
//!
//! Arguments:
//! - `<SPEC>` - Path to the AsyncAPI specification (required)
//! - `-o, --output <DIR>` - Output directory (default: `generated-client`)
//! - `--runtime-path <DIR>` - Use a local checkout of the runtime crate
//! - `--version` - Print the generator version
//!
//! Exit code 0 on success, 1 on any failure. Logging is configured through
//! the `WSGEN_LOG_*` variables described in [`crate::logging`].
//!
//! ## Usage from Code
//!
//! ```rust,no_run
//! use asyncapi_wsgen::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cli = Cli::parse();
//! run_cli(&cli)?;
//! # Ok(())
//! # }
//! ```

mod commands;
#[cfg(test)]
mod tests;

pub use commands::{run_cli, run_from_args, Cli};

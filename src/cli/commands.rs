use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::generator::{generate_client, GenerateOptions};
use crate::logging::{init_logging_with_config, LogConfig};

/// Generate a typed Rust WebSocket client from an AsyncAPI 3 specification
#[derive(Debug, Parser)]
#[command(name = "asyncapi-wsgen", version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to the AsyncAPI specification (YAML or JSON)
    pub spec: PathBuf,

    /// Directory to write the generated client crate to
    #[arg(short, long, default_value = "generated-client")]
    pub output: PathBuf,

    /// Depend on a local checkout of the runtime crate instead of the published version
    #[arg(long, value_name = "DIR")]
    pub runtime_path: Option<PathBuf>,
}

impl Cli {
    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            output_dir: self.output.clone(),
            runtime_path: self.runtime_path.clone(),
        }
    }
}

/// Generate the client described by `cli` and print a summary to stdout.
pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let artifact = generate_client(&cli.spec, &cli.generate_options())?;

    println!(
        "Generated {} ({}) in {}",
        artifact.client_name(),
        artifact.package_name(),
        cli.output.display()
    );
    for file in artifact.files() {
        println!("  {}", file.path().display());
    }
    let failures = artifact.resolution_failures();
    if !failures.is_empty() {
        println!(
            "{} reference(s) could not be resolved and use serde_json::Value:",
            failures.len()
        );
        for failure in failures {
            println!("  {failure}");
        }
    }
    Ok(())
}

/// Parse `args`, run the generator and return the process exit code.
///
/// `--help` and `--version` exit with 0. Usage errors, including a missing
/// spec path, and generation failures print to stderr and exit with 1.
pub fn run_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            if let Err(print_err) = err.print() {
                eprintln!("{print_err}");
            }
            return code;
        }
    };

    if let Err(err) = init_logging_with_config(&LogConfig::from_env()) {
        eprintln!("warning: {err:#}");
    }

    match run_cli(&cli) {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(error = %err, "generation failed");
            eprintln!("Error: {err:#}");
            1
        }
    }
}

//! Unit tests for CLI parsing

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::cli::{run_cli, run_from_args, Cli};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::{Path, PathBuf};

const GPIO_SPEC: &str = r##"{
  "asyncapi": "3.0.0",
  "info": { "title": "Phobos GPIO Interface API", "description": "GPIO control" },
  "servers": { "local": { "host": "localhost", "port": 8765, "protocol": "ws" } },
  "components": {
    "schemas": {
      "GpioStatus": { "type": "string", "enum": ["high", "low"] },
      "GpioMessage": {
        "type": "object",
        "properties": { "status": { "$ref": "#/components/schemas/GpioStatus" } },
        "required": ["status"]
      }
    }
  },
  "channels": {
    "gpio": {
      "messages": {
        "GpioMessage": { "payload": { "$ref": "#/components/schemas/GpioMessage" } }
      }
    }
  }
}"##;

#[test]
fn test_positional_spec_and_default_output() {
    let cli = Cli::try_parse_from(["asyncapi-wsgen", "asyncapi.yaml"]).unwrap();
    assert_eq!(cli.spec, PathBuf::from("asyncapi.yaml"));
    assert_eq!(cli.output, PathBuf::from("generated-client"));
    assert_eq!(cli.runtime_path, None);
}

#[test]
fn test_output_flags() {
    for flag in ["-o", "--output"] {
        let cli = Cli::try_parse_from(["asyncapi-wsgen", "spec.json", flag, "out"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("out"));
    }

    let cli = Cli::try_parse_from(["asyncapi-wsgen", "spec.json", "--runtime-path", "../wsgen"])
        .unwrap();
    let options = cli.generate_options();
    assert_eq!(options.runtime_path.as_deref(), Some(Path::new("../wsgen")));
    assert_eq!(options.output_dir, PathBuf::from("generated-client"));
}

#[test]
fn test_missing_spec_shows_help() {
    let err = Cli::try_parse_from(["asyncapi-wsgen"]).unwrap_err();
    assert_eq!(
        err.kind(),
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    );
}

#[test]
fn test_version_flag() {
    let err = Cli::try_parse_from(["asyncapi-wsgen", "--version"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);
}

#[test]
fn test_exit_codes_for_parse_outcomes() {
    assert_eq!(run_from_args(["asyncapi-wsgen", "--version"]), 0);
    assert_eq!(run_from_args(["asyncapi-wsgen", "--help"]), 0);
    assert_eq!(run_from_args(["asyncapi-wsgen"]), 1);
    assert_eq!(run_from_args(["asyncapi-wsgen", "a.json", "--bogus"]), 1);
}

#[test]
fn test_missing_spec_file_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("missing.json");
    let code = run_from_args([
        "asyncapi-wsgen".into(),
        spec.into_os_string(),
        "--output".into(),
        dir.path().join("out").into_os_string(),
    ]);
    assert_eq!(code, 1);
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_run_cli_writes_client() {
    let dir = tempfile::tempdir().unwrap();
    let spec = dir.path().join("gpio.json");
    std::fs::write(&spec, GPIO_SPEC).unwrap();

    let cli = Cli {
        spec,
        output: dir.path().join("client"),
        runtime_path: None,
    };
    run_cli(&cli).unwrap();

    let source = std::fs::read_to_string(dir.path().join("client/src/client.rs")).unwrap();
    assert!(source.contains("pub struct PhobosGpioInterfaceApiClient"));
    assert!(source.contains("pub async fn send_gpio_message(&self, payload: &GpioMessage)"));
    assert!(source.contains("pub fn on_gpio_message<F>(&self, handler: F)"));
    assert!(source.contains("pub status: GpioStatus,"));
}

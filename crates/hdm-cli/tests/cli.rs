//! Integration tests for the `hdm` binary and its argument parsing.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use clap::Parser;
use hdm_cli::cli::{Cli, Command as CliCommand};

fn hdm(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hdm"))
        .args(args)
        .current_dir(dir)
        .env_remove("HDM_CONFIG")
        .env_remove("HDM_LAYOUTS_DIR")
        .env_remove("RUST_LOG")
        .env_remove("DATABRICKS_TOKEN")
        .output()
        .expect("run hdm")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn parses_map_arguments() {
    let cli = Cli::try_parse_from([
        "hdm",
        "map",
        "--layout",
        "Bill Custom Detail",
        "--dictionary",
        "dict.csv",
        "--tables",
        "claims_detail,claims_header",
        "--prompt-only",
    ])
    .expect("parse");
    match cli.command {
        CliCommand::Map(args) => {
            assert_eq!(args.layout, "Bill Custom Detail");
            assert_eq!(args.model, "claude-sonnet-4");
            assert!(args.prompt_only);
            assert!(args.output.is_none());
        }
        _ => panic!("expected map command"),
    }
}

#[test]
fn layout_limit_and_all_conflict() {
    let result = Cli::try_parse_from(["hdm", "layout", "member", "--limit", "5", "--all"]);
    assert!(result.is_err());
}

#[test]
fn layouts_command_lists_the_three_layouts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = hdm(&["layouts"], dir.path());
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Member"));
    assert!(text.contains("Service Provider"));
    assert!(text.contains("Bill Custom Detail"));
    assert!(text.contains("124"));
}

#[test]
fn unknown_layout_exits_non_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = hdm(&["layout", "pharmacy"], dir.path());
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unknown layout"));
}

#[test]
fn prompt_only_writes_the_prompt() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("dict.csv"),
        "table,column,type,description\nclaims_detail,claim_id,string,Claim key\n",
    )
    .expect("write dictionary");

    let output = hdm(
        &[
            "map",
            "--layout",
            "member",
            "--dictionary",
            "dict.csv",
            "--tables",
            "claims_detail",
            "--prompt-only",
            "--output",
            "prompt.txt",
        ],
        dir.path(),
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let prompt = fs::read_to_string(dir.path().join("prompt.txt")).expect("prompt");
    assert!(prompt.contains("claims_detail.claim_id: string - Claim key"));
    assert!(prompt.contains("[[HDM-V1:FIELD_MAPPINGS]]"));
}

#[test]
fn unknown_model_reports_invocation_stage() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("dict.csv"),
        "table,column\nclaims_detail,claim_id\n",
    )
    .expect("write dictionary");

    let output = hdm(
        &[
            "map",
            "--layout",
            "member",
            "--dictionary",
            "dict.csv",
            "--tables",
            "claims_detail",
            "--model",
            "gpt-4o",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("error: invocation: unknown model 'gpt-4o'"), "{err}");
    assert!(err.contains("hint:"));
}

#[test]
fn missing_token_is_reported_before_any_request() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("dict.csv"),
        "table,column\nclaims_detail,claim_id\n",
    )
    .expect("write dictionary");

    let output = hdm(
        &[
            "map",
            "--layout",
            "member",
            "--dictionary",
            "dict.csv",
            "--tables",
            "claims_detail",
        ],
        dir.path(),
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("authentication failed"));
}

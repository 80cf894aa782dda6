// CrashSleuth - tests/e2e_cli.rs
//
// End-to-end tests for the command-line binary: argument handling, output
// modes and exit codes.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn crashsleuth(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_crashsleuth"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("binary runs")
}

fn path_arg(path: &PathBuf) -> &str {
    path.to_str().expect("fixture path is UTF-8")
}

#[test]
fn e2e_cli_prints_pages() {
    let registry = fixture("registry.json");
    let facts = fixture("speedrun_facts.json");
    let output = crashsleuth(&[path_arg(&facts), "--registry", path_arg(&registry)]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("outdated version of SpeedRunIGT"));
}

#[test]
fn e2e_cli_json_output() {
    let registry = fixture("registry.json");
    let facts = fixture("speedrun_facts.json");
    let output = crashsleuth(&[path_arg(&facts), "--registry", path_arg(&registry), "--json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["amount"].as_u64().unwrap() > 0);
}

#[test]
fn e2e_cli_failed_input_exits_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    let facts = fixture("speedrun_facts.json");
    let registry = fixture("registry.json");
    let output = crashsleuth(&[
        path_arg(&facts),
        path_arg(&missing),
        "--registry",
        path_arg(&registry),
    ]);

    assert_eq!(output.status.code(), Some(1));
    // The good input is still reported.
    assert!(String::from_utf8_lossy(&output.stdout).contains("SpeedRunIGT"));
}

#[test]
fn e2e_cli_rejects_log_with_several_inputs() {
    let facts = fixture("speedrun_facts.json");
    let output = crashsleuth(&[path_arg(&facts), path_arg(&facts), "--log", path_arg(&facts)]);
    assert_eq!(output.status.code(), Some(2));
}

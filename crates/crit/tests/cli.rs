//! Integration tests for the `crit` binary.
//!
//! Each test runs the built binary with `CRIT_CONFIG` pointed into its own
//! temporary directory so the user's real configuration is never read.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

fn crit(config_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crit"));
    cmd.env("CRIT_CONFIG", config_dir.join("config.toml"))
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

fn run(config_dir: &Path, args: &[&str]) -> Output {
    crit(config_dir).args(args).output().expect("failed to run crit")
}

fn run_with_stdin(config_dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = crit(config_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn crit");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for crit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ============================================================================
// fmt / sort
// ============================================================================

#[test]
fn fmt_prints_canonical_form() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["fmt", "[age] > 30 and [name] contains \"al\""]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim_end(),
        "[age] > 30 AND [name] CONTAINS \"al\""
    );
}

#[test]
fn fmt_json_includes_tree() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["--json", "fmt", "([A] == 1 OR [B] == 2) AND [C] == TRUE"]);
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["filter"], "([A] == 1 OR [B] == 2) AND [C] == TRUE");
    assert_eq!(json["conditions"], 3);
    assert_eq!(json["tree"].as_array().map(Vec::len), Some(2));
}

#[test]
fn fmt_syntax_error_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["fmt", "[Name == \"Alice\""]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("syntax error"));
}

#[test]
fn json_errors_are_structured() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["--json", "fmt", "[A] = 1"]);
    assert_eq!(output.status.code(), Some(1));

    let error: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(error["error"]["code"], "SYNTAX_ERROR");
    assert!(error["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown operator"));
}

#[test]
fn sort_orders_runs_and_clauses() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["sort", "[B] == 1 AND [A] == 2 OR [C] == 3"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "[C] == 3 OR [A] == 2 AND [B] == 1");
}

// ============================================================================
// split
// ============================================================================

#[test]
fn split_prints_one_chunk_per_line() {
    let dir = TempDir::new().unwrap();
    let expr = "[Id] == 1 OR [Id] == 2 OR [Id] == 3";
    let output = run(dir.path(), &["split", expr, "--chunk-size", "2"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "[Id] == 1 OR [Id] == 2\n[Id] == 3\n");
}

#[test]
fn split_uses_configured_chunk_size() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[engine]\nchunk_size = 1\n").unwrap();

    let output = run(dir.path(), &["--json", "split", "[Id] == 1 OR [Id] == 2"]);
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["split"], true);
    assert_eq!(json["chunk_size"], 1);
    assert_eq!(json["chunks"], serde_json::json!(["[Id] == 1", "[Id] == 2"]));
}

#[test]
fn split_reports_unsplittable_filter() {
    let dir = TempDir::new().unwrap();
    let expr = "[Id] == 1 AND [Id] == 2 OR [Id] == 3";
    let output = run(dir.path(), &["split", expr, "-c", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), expr);
    assert!(stderr(&output).contains("not splittable"));
}

// ============================================================================
// match
// ============================================================================

#[test]
fn match_reads_documents_from_stdin() {
    let dir = TempDir::new().unwrap();
    let docs = r#"[{"Name": "alice", "Age": 31}, {"Name": "Bob", "Age": 25}]"#;
    let output = run_with_stdin(dir.path(), &["match", "[Name] == \"Alice\""], docs);
    assert!(output.status.success(), "{}", stderr(&output));

    let lines: Vec<Value> = stdout(&output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines, vec![serde_json::json!({"Name": "alice", "Age": 31})]);
    assert!(stderr(&output).contains("1 of 2 documents matched"));
}

#[test]
fn match_reads_documents_from_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("docs.json");
    fs::write(&input, r#"{"Tags": ["red", "blue"]}"#).unwrap();

    let output = run(
        dir.path(),
        &["--json", "match", "[Tags] == \"BLUE\"", "--input", input.to_str().unwrap()],
    );
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["total"], 1);
    assert_eq!(json["matched"], 1);
}

#[test]
fn match_missing_field_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = run_with_stdin(dir.path(), &["match", "[Nope] == 1"], r#"{"A": 1}"#);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("field not found: Nope"));
}

#[test]
fn match_missing_input_file_exits_with_three() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let output = run(
        dir.path(),
        &["match", "[A] == 1", "--input", missing.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(3));
}

// ============================================================================
// config / completions
// ============================================================================

#[test]
fn config_path_honors_env_override() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["config", "path"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        dir.path().join("config.toml").display().to_string()
    );
}

#[test]
fn config_show_reports_engine_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[engine]\nmax_depth = 8\n").unwrap();

    let output = run(dir.path(), &["--json", "config", "show"]);
    assert!(output.status.success());

    let json = json_stdout(&output);
    assert_eq!(json["exists"], true);
    assert_eq!(json["config"]["engine"]["max_depth"], 8);
    assert_eq!(json["config"]["engine"]["chunk_size"], 100);
}

#[test]
fn broken_config_exits_with_five() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "engine = [").unwrap();

    let output = run(dir.path(), &["fmt", "[A] == 1"]);
    assert_eq!(output.status.code(), Some(5));

    // The path is still reported so the file can be fixed
    let output = run(dir.path(), &["config", "path"]);
    assert!(output.status.success());
}

#[test]
fn configured_depth_limit_applies() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[engine]\nmax_depth = 1\n").unwrap();

    assert!(run(dir.path(), &["fmt", "([A] == 1)"]).status.success());
    let output = run(dir.path(), &["fmt", "(([A] == 1))"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("deeper"));
}

#[test]
fn completions_generate_script() {
    let dir = TempDir::new().unwrap();
    let output = run(dir.path(), &["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("crit"));
}

//! End-to-end tests of the `permdoc` binary.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config file.
fn permdoc(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("permdoc").unwrap();
    cmd.env("PERMDOC_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn write_file(path: &Path, mode: u32) {
    std::fs::write(path, b"#!/bin/sh\n").unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).unwrap();
}

#[test]
fn missing_target_exits_one() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("absent.txt");

    permdoc(&dir)
        .args(["check", target.to_str().unwrap(), "-o", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"TARGET_MISSING\""));
}

#[test]
fn accessible_file_exits_zero_with_parseable_report() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("notes.txt");
    write_file(&target, 0o644);

    let output = permdoc(&dir)
        .args(["check", target.to_str().unwrap(), "-o", "structured"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["state"]["kind"], "file");
    assert!(json["findings"].is_array());
}

#[test]
fn empty_target_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    permdoc(&dir)
        .args(["check", ""])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("must not be empty"));
}

#[test]
fn text_report_has_sections() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("run.sh");
    write_file(&target, 0o755);

    permdoc(&dir)
        .args(["check", target.to_str().unwrap(), "-o", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Target"))
        .stdout(predicate::str::contains("Findings"))
        .stdout(predicate::str::contains("exit status 0"));
}

#[test]
fn command_target_resolves_through_path() {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    write_file(&bin.join("mytool"), 0o755);

    permdoc(&dir)
        .env("PATH", &bin)
        .args(["check", "mytool", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"COMMAND_RESOLVED\""));

    permdoc(&dir)
        .env("PATH", &bin)
        .args(["check", "--command", "nosuchtool", "-o", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"COMMAND_NOT_FOUND\""));
}

#[test]
fn which_lists_shadowed_matches() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");
    std::fs::create_dir(&first).unwrap();
    std::fs::create_dir(&second).unwrap();
    write_file(&first.join("tool"), 0o755);
    write_file(&second.join("tool"), 0o755);
    let search = format!("{}:{}", first.display(), second.display());

    let output = permdoc(&dir)
        .env("PATH", &search)
        .args(["which", "tool", "--all", "-o", "text"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(first.to_str().unwrap()));

    permdoc(&dir)
        .env("PATH", &search)
        .args(["which", "missing-tool"])
        .assert()
        .code(1);
}

#[test]
fn path_audit_reports_hygiene_findings() {
    let dir = TempDir::new().unwrap();
    permdoc(&dir)
        .args(["path", "--value", "/bin::/bin/", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("EMPTY_PATH_SEGMENT"))
        .stdout(predicate::str::contains("DUPLICATE_PATH_ENTRY"));
}

#[test]
fn path_clean_keeps_first_occurrence() {
    let dir = TempDir::new().unwrap();
    permdoc(&dir)
        .args(["path", "--clean", "--value", "/usr/bin:/bin:/usr/bin:/sbin"])
        .assert()
        .success()
        .stdout("/usr/bin:/bin:/sbin\n");
}

#[test]
fn config_set_persists_and_validates() {
    let dir = TempDir::new().unwrap();

    permdoc(&dir)
        .args(["config", "set", "check_hard_links", "false"])
        .assert()
        .success();
    let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains("check_hard_links = false"));

    permdoc(&dir)
        .args(["config", "set", "max_link_depth", "0"])
        .assert()
        .failure();

    permdoc(&dir)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));

    permdoc(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn explain_is_skipped_for_machine_output() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("f");
    write_file(&target, 0o644);

    permdoc(&dir)
        .args(["check", target.to_str().unwrap(), "--explain"])
        .assert()
        .stdout(predicate::str::contains("What This Does"));

    permdoc(&dir)
        .args(["check", target.to_str().unwrap(), "--explain", "-o", "json"])
        .assert()
        .stdout(predicate::str::contains("What This Does").not());
}

#[test]
fn names_with_slash_never_match_through_path() {
    let dir = TempDir::new().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    let tool = dir.path().join("tool");
    write_file(&tool, 0o755);

    permdoc(&dir)
        .env("PATH", &bin)
        .args(["check", "--command", tool.to_str().unwrap(), "-o", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"COMMAND_NOT_FOUND\""))
        .stdout(predicate::str::contains("\"COMMAND_RESOLVED\"").not());

    permdoc(&dir)
        .env("PATH", &bin)
        .args(["which", tool.to_str().unwrap(), "-o", "text"])
        .assert()
        .code(1)
        .stdout("");
}

#[test]
fn verbose_logging_stays_off_stdout() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("notes.txt");
    write_file(&target, 0o644);

    let output = permdoc(&dir)
        .args(["-v", "check", target.to_str().unwrap(), "-o", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["state"]["kind"], "file");
    assert!(!output.stderr.is_empty());
}

#[test]
fn unparseable_config_is_reported_as_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "max_link_depth = \"deep\"\n").unwrap();

    permdoc(&dir)
        .args(["config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("configuration error"));
}

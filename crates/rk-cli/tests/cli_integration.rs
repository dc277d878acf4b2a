//! Integration tests for the `resolute` binary, exercising the build,
//! resolve, and verify subcommands end-to-end through the filesystem.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn resolute() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("resolute").expect("binary `resolute` should be built")
}

fn write_sample_declarations(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("resources.json");
    let declarations = serde_json::json!([
        {
            "id": "app.title",
            "resourceTypeName": "string",
            "candidates": [
                {
                    "json": {"text": "Hello"},
                    "conditions": [{"qualifierName": "language", "value": "en"}]
                },
                {
                    "json": {"text": "Bonjour"},
                    "conditions": [{"qualifierName": "language", "value": "fr"}]
                }
            ]
        }
    ]);
    fs::write(&path, serde_json::to_string_pretty(&declarations).unwrap()).unwrap();
    path
}

#[test]
fn help_exits_zero_and_contains_expected_text() {
    resolute()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conditional resource resolution engine"))
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn version_shows_version_string() {
    resolute()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn build_then_resolve_returns_expected_payload() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");

    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    assert!(output.exists());

    resolute()
        .args([
            "resolve",
            "--bundle",
            output.to_str().unwrap(),
            "--resource",
            "app.title",
            "--set",
            "language=en",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"));

    resolute()
        .args([
            "resolve",
            "--bundle",
            output.to_str().unwrap(),
            "--resource",
            "app.title",
            "--set",
            "language=fr",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bonjour"));
}

#[test]
fn resolve_unknown_resource_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    resolute()
        .args([
            "resolve",
            "--bundle",
            output.to_str().unwrap(),
            "--resource",
            "app.missing",
            "--set",
            "language=en",
        ])
        .assert()
        .failure();
}

#[test]
fn verify_succeeds_on_untampered_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    resolute()
        .args(["verify", "--bundle", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn verify_fails_on_tampered_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    let mut bundle: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    bundle["compiledCollection"]["resources"][0]["id"] = serde_json::json!("tampered");
    fs::write(&output, serde_json::to_string(&bundle).unwrap()).unwrap();

    resolute()
        .args(["verify", "--bundle", output.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn resolve_with_skip_checksum_verification_succeeds_on_tampered_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    let mut bundle: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    bundle["compiledCollection"]["resources"][0]["id"] = serde_json::json!("renamed");
    fs::write(&output, serde_json::to_string(&bundle).unwrap()).unwrap();

    resolute()
        .args([
            "resolve",
            "--bundle",
            output.to_str().unwrap(),
            "--resource",
            "renamed",
            "--set",
            "language=en",
            "--skip-checksum-verification",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello"));
}

#[test]
fn build_with_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args([
            "build",
            "--config",
            "nonexistent",
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
        .assert()
        .failure();
}

#[test]
fn compact_format_produces_single_line_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_sample_declarations(dir.path());
    let output = dir.path().join("bundle.json");
    resolute()
        .args(["build", "--input", input.to_str().unwrap(), "--output", output.to_str().unwrap()])
        .assert()
        .success();

    let assert = resolute()
        .args([
            "--format",
            "compact",
            "resolve",
            "--bundle",
            output.to_str().unwrap(),
            "--resource",
            "app.title",
            "--set",
            "language=en",
        ])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert_eq!(stdout.lines().count(), 1);
}

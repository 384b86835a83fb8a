#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests for the `oaslint` binary

use std::path::PathBuf;
use std::process::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn oaslint() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_oaslint"));
    command.env_remove("RUST_LOG").env("OASLINT_LOG_LEVEL", "error");
    command
}

#[test]
fn test_cli_clean_document_succeeds() {
    let output = oaslint()
        .arg("lint")
        .arg(fixture("clean.yaml"))
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("No lint issues found"));
}

#[test]
fn test_cli_errors_fail_the_run() {
    let output = oaslint()
        .arg("lint")
        .arg(fixture("petstore.yaml"))
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("❌ Errors (must fix):"));
    assert!(stdout.contains("⚠️  Warnings (should fix):"));
    assert!(stdout.contains("[noAmbiguousPaths] $.paths['/pets/mine']"));
}

#[test]
fn test_cli_fail_severity_none() {
    let status = oaslint()
        .arg("lint")
        .arg(fixture("petstore.yaml"))
        .args(["--fail-severity", "none"])
        .status()
        .expect("run cli");
    assert!(status.success());
}

#[test]
fn test_cli_json_output_is_machine_readable() {
    let output = oaslint()
        .arg("lint")
        .arg(fixture("swagger.yaml"))
        .args(["--format", "json", "--rule", "camelCaseProperties"])
        .output()
        .expect("run cli");
    // warnings only, below the default fail severity
    assert!(output.status.success());
    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let findings = findings.as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["ruleId"], "camelCaseProperties");
    assert_eq!(findings[0]["severity"], "warn");
    assert!(findings[0]["timestamp"].as_u64().unwrap() > 0);
}

#[test]
fn test_cli_ruleset_file() {
    let dir = tempfile::tempdir().unwrap();
    let ruleset = dir.path().join("ruleset.yaml");
    std::fs::write(
        &ruleset,
        "rules:\n  camelCaseProperties:\n    severity: error\n    message: use camelCase\n",
    )
    .unwrap();

    let output = oaslint()
        .arg("lint")
        .arg(fixture("swagger.yaml"))
        .arg("--ruleset")
        .arg(&ruleset)
        .args(["--rule", "camelCaseProperties", "--format", "json"])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let findings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(findings[0]["message"], "use camelCase");
    assert_eq!(findings[0]["severity"], "error");
}

#[test]
fn test_cli_load_failure() {
    let output = oaslint()
        .arg("lint")
        .arg(fixture("broken.yaml"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load"));
}

#[test]
fn test_cli_rules_listing() {
    let output = oaslint().arg("rules").output().expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for id in [
        "camelCaseProperties",
        "oasComponentDescriptions",
        "examples",
        "oasExampleExternal",
        "oasExampleMissing",
        "oasExampleSchema",
        "noAmbiguousPaths",
        "schemaTypeCheck",
        "oasParamDescriptions",
        "oasUnnecessaryCombinator",
    ] {
        assert!(stdout.contains(id), "missing {}", id);
    }
}

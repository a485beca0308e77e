//! End-to-end tests for the `joinery` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[files.javascripts.joinTo]
"js/app.js" = "^app/"
"js/vendor.js" = "^vendor/"

[files.stylesheets]
joinTo = "css/app.css"

[overrides.production]
optimize = true
"#;

fn project() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("joinery-config.toml"), CONFIG).expect("write config");
    dir
}

fn joinery() -> Command {
    let mut cmd = Command::cargo_bin("joinery").expect("binary");
    cmd.env_remove("JOINERY_ENV")
        .env_remove("JOINERY_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

#[test]
fn resolve_prints_summary() {
    let dir = project();
    joinery()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("javascripts:"))
        .stdout(predicate::str::contains("  -> js/vendor.js"))
        .stdout(predicate::str::contains("plugin helpers: js/vendor.js"))
        .stdout(predicate::str::contains("optimize: false"));
}

#[test]
fn resolve_json_applies_environments() {
    let dir = project();
    let output = joinery()
        .args(["resolve", "--json", "-e", "production", "--root"])
        .arg(dir.path())
        .output()
        .expect("run joinery");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["optimize"], serde_json::json!(true));
    assert_eq!(json["env"], serde_json::json!(["production"]));
    assert_eq!(
        json["_normalized"]["join"]["stylesheets"]["pluginHelpers"],
        serde_json::json!(["css/app.css"])
    );
}

#[test]
fn process_environment_comes_from_joinery_env() {
    let dir = project();
    joinery()
        .env("JOINERY_ENV", "production")
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("environments: production"))
        .stdout(predicate::str::contains("optimize: true"));
}

#[test]
fn join_reports_destinations() {
    let dir = project();
    joinery()
        .args(["join", "--root"])
        .arg(dir.path())
        .args(["javascripts", "app/main.js", "vendor/jquery.js", "lib/x.js"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app/main.js: js/app.js\n"))
        .stdout(predicate::str::contains("vendor/jquery.js: js/vendor.js (vendor)"))
        .stdout(predicate::str::contains("lib/x.js: -"));
}

#[test]
fn join_rejects_unknown_type() {
    let dir = project();
    joinery()
        .args(["join", "--root"])
        .arg(dir.path())
        .args(["templates", "app/a.hbs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown file type 'templates'"));
}

#[test]
fn missing_config_fails_with_hint() {
    let dir = TempDir::new().expect("tempdir");
    joinery()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("joinery-config.toml"));
}

#[test]
fn deprecations_are_warned_about() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(
        dir.path().join("joinery-config.json"),
        r#"{ "buildPath": "out", "files": { "javascripts": { "joinTo": "app.js" } } }"#,
    )
    .unwrap();
    joinery()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("config.buildPath moved to config.paths.public"));
}

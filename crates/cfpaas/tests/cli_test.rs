#![allow(deprecated)]

mod common;

use assert_cmd::Command;
use common::{BLUEPRINT, TestProject};
use predicates::prelude::*;

/// Help lists the lifecycle commands
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("cfpaas").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloud Foundry"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("service"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("cfpaas").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cfpaas"));
}

#[test]
fn test_scale_help() {
    let mut cmd = Command::cargo_bin("cfpaas").unwrap();
    cmd.args(["scale", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("--disk"))
        .stdout(predicate::str::contains("--instances"));
}

#[test]
fn test_down_help() {
    let mut cmd = Command::cargo_bin("cfpaas").unwrap();
    cmd.args(["down", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--delete"));
}

#[test]
fn test_service_help() {
    let mut cmd = Command::cargo_bin("cfpaas").unwrap();
    cmd.args(["service", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("bind"));
}

/// validate reads the blueprint from the current directory without connecting
#[test]
fn test_validate_blueprint() {
    let project = TestProject::new();
    project.write_blueprint(BLUEPRINT);

    project
        .command()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blueprint is valid"))
        .stdout(predicate::str::contains("shop"))
        .stdout(predicate::str::contains("shop.example.com"))
        .stdout(predicate::str::contains("orders-db"));
}

/// Location fields may come from the CF_* environment
#[test]
fn test_validate_with_env_credentials() {
    let project = TestProject::new();
    project.write_blueprint(&BLUEPRINT.replace("  credential: secret\n", ""));

    project
        .command()
        .arg("validate")
        .env("CF_PASSWORD", "from-env")
        .assert()
        .success();
}

#[test]
fn test_validate_missing_credential() {
    let project = TestProject::new();
    project.write_blueprint(&BLUEPRINT.replace("  credential: secret\n", ""));

    project
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("credential"));
}

#[test]
fn test_validate_unknown_service() {
    let project = TestProject::new();
    project.write_blueprint(&BLUEPRINT.replace("[orders-db]", "[cache]"));

    project
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown service cache"));
}

/// Services without an instance name could never be found again by later runs
#[test]
fn test_validate_unnamed_service() {
    let project = TestProject::new();
    project.write_blueprint(&format!(
        "{}  - offering: rediscloud\n    plan: 30mb\n",
        BLUEPRINT
    ));

    project
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs an instance_name"));
}

#[test]
fn test_explicit_blueprint_file() {
    let project = TestProject::new();
    let file = project.path().join("staging.yaml");
    std::fs::write(&file, BLUEPRINT).unwrap();

    project
        .command()
        .args(["validate", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("staging.yaml"));
}

#[test]
fn test_missing_blueprint() {
    let project = TestProject::new();

    project
        .command()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Blueprint not found"));
}

/// Argument errors are reported before any platform call
#[test]
fn test_scale_without_flags() {
    let project = TestProject::new();
    project.write_blueprint(BLUEPRINT);

    project
        .command()
        .args(["scale", "shop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to scale"));
}

#[test]
fn test_env_without_pairs() {
    let project = TestProject::new();
    project.write_blueprint(BLUEPRINT);

    project
        .command()
        .args(["env", "shop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no variables given"));
}

#[test]
fn test_env_with_malformed_pair() {
    let project = TestProject::new();
    project.write_blueprint(BLUEPRINT);

    project
        .command()
        .args(["env", "shop", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

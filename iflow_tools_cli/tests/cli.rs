use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn lint_cmd() -> Command {
    let mut cmd = Command::cargo_bin("iflow-lint").unwrap();
    cmd.env_remove("IFLOW_TOOLS_CONFIG");
    cmd
}

fn sync_cmd() -> Command {
    let mut cmd = Command::cargo_bin("iflow-sync").unwrap();
    cmd.env_remove("IFLOW_TOOLS_CONFIG");
    cmd
}

#[test]
fn test_version() {
    lint_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    sync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_subcommands() {
    lint_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("changed"))
        .stdout(predicate::str::contains("package"))
        .stdout(predicate::str::contains("--config"));
    sync_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pull"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn test_missing_subcommand_is_misuse() {
    lint_cmd().assert().code(2);
}

#[test]
fn test_unknown_subcommand_is_misuse() {
    lint_cmd()
        .arg("lint-everything")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = TempDir::new().unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .args(["-c", "nope.yaml", "all"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Config file not found"))
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_config_env_must_exist() {
    let dir = TempDir::new().unwrap();
    sync_cmd()
        .current_dir(dir.path())
        .env("IFLOW_TOOLS_CONFIG", dir.path().join("gone.yaml"))
        .arg("pull")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("IFLOW_TOOLS_CONFIG"));
}

#[test]
fn test_no_config_found() {
    let dir = TempDir::new().unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .arg("all")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("No configuration file found"))
        .stderr(predicate::str::contains("-c <config-file>"));
}

#[test]
fn test_invalid_config_is_misuse() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("iflow-tools.yaml"), "max_parallel: [1, 2]\n").unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .args(["config", "show"])
        .assert()
        .code(2);
}

#[test]
fn test_completions_need_no_config() {
    let dir = TempDir::new().unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iflow-lint"));
}

#[test]
fn test_config_path_uses_local_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("iflow-tools.yml"), "").unwrap();
    sync_cmd()
        .current_dir(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("iflow-tools.yml"));
}

#[test]
fn test_config_show_applies_env_overrides() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("iflow-tools.yaml"),
        "max_parallel: 2\nlint:\n  rules: rules.xml\n",
    )
    .unwrap();

    lint_cmd()
        .current_dir(dir.path())
        .env("IFLOW_TOOLS_MAX_PARALLEL", "7")
        .env("IFLOW_TOOLS_LINT__RULES", "custom-rules.xml")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_parallel\": 7"))
        .stdout(predicate::str::contains("custom-rules.xml"))
        .stdout(predicate::str::contains("\"binary\": \"cpilint\""));
}

#[test]
fn test_missing_packages_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("iflow-tools.yaml"), "packages_dir: content\n").unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .arg("list")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("content"));
}

#[test]
fn test_changed_outside_git_repository() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("packages")).unwrap();
    fs::write(
        dir.path().join("iflow-tools.yaml"),
        "lint:\n  rules: rules.xml\n",
    )
    .unwrap();
    lint_cmd()
        .current_dir(dir.path())
        .arg("changed")
        .assert()
        .code(4);
}

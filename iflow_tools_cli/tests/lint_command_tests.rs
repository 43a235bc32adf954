#![cfg(unix)]

use assert_cmd::Command;
use iflow_test_utils::{FakeTool, TestRepo, TestRepoBuilder};
use predicates::prelude::*;

fn lint_repo(tool: &FakeTool) -> TestRepo {
    TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_iflow("Orders", "OrderCancel")
        .with_iflow("Billing", "InvoiceSend")
        .with_file("governance/rules.xml", "<cpilint/>\n")
        .with_config(&format!(
            "lint:\n  binary: '{}'\n  rules: governance/rules.xml\n",
            tool.path().display()
        ))
        .build()
}

fn lint(repo: &TestRepo) -> Command {
    let mut cmd = Command::cargo_bin("iflow-lint").unwrap();
    cmd.env_remove("IFLOW_TOOLS_CONFIG")
        .current_dir(repo.path())
        .arg("-c")
        .arg(repo.config_path());
    cmd
}

#[test]
fn test_lint_all_runs_every_package() {
    let tool = FakeTool::new("cpilint").printing("no issues").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .arg("all")
        .assert()
        .success()
        .stdout(predicate::str::contains("==> Orders"))
        .stdout(predicate::str::contains("==> Billing"))
        .stdout(predicate::str::contains("no issues"))
        .stderr(predicate::str::contains("2 job(s): 2 succeeded, 0 failed"));

    let calls = tool.calls();
    assert_eq!(calls.len(), 2);
    for call in &calls {
        assert!(
            call.flag_value("-rules")
                .unwrap()
                .ends_with("governance/rules.xml")
        );
    }
    let mut dirs: Vec<_> = calls
        .iter()
        .map(|c| c.flag_value("-directory").unwrap().to_string())
        .collect();
    dirs.sort();
    assert!(dirs[0].ends_with("packages/Billing"));
    assert!(dirs[1].ends_with("packages/Orders"));
}

#[test]
fn test_lint_changed_with_clean_tree() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .arg("changed")
        .assert()
        .success()
        .stderr(predicate::str::contains("No changed packages to lint"));

    assert!(tool.calls().is_empty());
}

#[test]
fn test_lint_changed_only_touched_packages() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);
    repo.write_file(
        "packages/Billing/InvoiceSend/script/mapping.groovy",
        "// edited\n",
    );

    lint(&repo).arg("changed").assert().success();

    let calls = tool.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0]
            .flag_value("-directory")
            .unwrap()
            .ends_with("packages/Billing")
    );
}

#[test]
fn test_lint_changed_against_base_ref() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);
    let base = repo.head();
    repo.add_iflow("Orders", "OrderRefund");
    repo.commit_all("add refund flow");

    lint(&repo).arg("changed").assert().success();
    assert!(tool.calls().is_empty());

    lint(&repo)
        .args(["changed", "--base", &base])
        .assert()
        .success();

    let calls = tool.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0]
            .flag_value("-directory")
            .unwrap()
            .ends_with("packages/Orders")
    );
}

#[test]
fn test_lint_changed_unknown_base() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .args(["changed", "--base", "no-such-branch"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no-such-branch"));
}

#[test]
fn test_lint_named_packages() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo).args(["package", "Orders"]).assert().success();

    let calls = tool.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0]
            .flag_value("-directory")
            .unwrap()
            .ends_with("packages/Orders")
    );
}

#[test]
fn test_lint_unknown_package_suggests_closest() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .args(["package", "Order"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Did you mean 'Orders'?"));

    assert!(tool.calls().is_empty());
}

#[test]
fn test_lint_dry_run_prints_invocations() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .args(["--dry-run", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Orders]"))
        .stdout(predicate::str::contains("-rules"))
        .stdout(predicate::str::contains("-directory"));

    assert!(tool.calls().is_empty());
}

#[test]
fn test_lint_failure_exit_code() {
    let tool = FakeTool::new("cpilint").exiting_with(1).install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .args(["-j", "1", "all"])
        .assert()
        .code(3)
        .stdout(predicate::str::contains("failed"))
        .stderr(predicate::str::contains("2 of 2 job(s) failed"));

    assert_eq!(tool.calls().len(), 2);
}

#[test]
fn test_lint_missing_binary_exit_code() {
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_config("lint:\n  binary: ./bin/no-such-linter\n  rules: rules.xml\n")
        .build();

    lint(&repo)
        .arg("all")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("could not start"));
}

#[test]
fn test_lint_requires_rules() {
    let tool = FakeTool::new("cpilint").install();
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_config(&format!("lint:\n  binary: '{}'\n", tool.path().display()))
        .build();

    lint(&repo)
        .arg("all")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("lint.rules"));

    assert!(tool.calls().is_empty());
}

#[test]
fn test_lint_respects_package_filters() {
    let tool = FakeTool::new("cpilint").install();
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_iflow("Legacy_Orders", "OldFlow")
        .with_config(&format!(
            "packages:\n  exclude: ['Legacy_*']\nlint:\n  binary: '{}'\n  rules: rules.xml\n",
            tool.path().display()
        ))
        .build();

    lint(&repo).arg("all").assert().success();

    let calls = tool.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0]
            .flag_value("-directory")
            .unwrap()
            .ends_with("packages/Orders")
    );
}

#[test]
fn test_list_json() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    let output = lint(&repo).args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let packages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = packages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["Billing", "Orders"]);
    assert_eq!(packages[1]["iflows"].as_array().unwrap().len(), 2);
}

#[test]
fn test_list_tree() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Orders (2 iFlows)"))
        .stdout(predicate::str::contains("  InvoiceSend"));
}

#[test]
fn test_jobs_option_overrides_max_parallel() {
    let tool = FakeTool::new("cpilint").sleeping("0.2").install();
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_iflow("Billing", "InvoiceSend")
        .with_iflow("Shipping", "ShipmentNotify")
        .with_config(&format!(
            "max_parallel: 3\nlint:\n  binary: '{}'\n  rules: rules.xml\n",
            tool.path().display()
        ))
        .build();

    lint(&repo).args(["-j", "1", "all"]).assert().success();

    assert_eq!(tool.calls().len(), 3);
    assert_eq!(tool.peak_concurrency(), 1);
}

#[test]
fn test_max_parallel_from_config() {
    let tool = FakeTool::new("cpilint").sleeping("0.2").install();
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_iflow("Billing", "InvoiceSend")
        .with_iflow("Shipping", "ShipmentNotify")
        .with_config(&format!(
            "max_parallel: 1\nlint:\n  binary: '{}'\n  rules: rules.xml\n",
            tool.path().display()
        ))
        .build();

    lint(&repo).arg("all").assert().success();

    assert_eq!(tool.calls().len(), 3);
    assert_eq!(tool.peak_concurrency(), 1);
}

#[test]
fn test_duplicate_package_ids_run_once() {
    let tool = FakeTool::new("cpilint").install();
    let repo = lint_repo(&tool);

    lint(&repo)
        .args(["package", "Orders", "Billing", "Orders"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 job(s)"));

    assert_eq!(tool.calls().len(), 2);
}

#[test]
fn test_lint_changed_before_first_commit() {
    let tool = FakeTool::new("cpilint").install();
    let repo = TestRepoBuilder::new()
        .with_iflow("Orders", "OrderCreate")
        .with_config(&format!(
            "lint:\n  binary: '{}'\n  rules: rules.xml\n",
            tool.path().display()
        ))
        .without_commit()
        .build();

    lint(&repo).arg("changed").assert().success();

    let calls = tool.calls();
    assert_eq!(calls.len(), 1);
    assert!(
        calls[0]
            .flag_value("-directory")
            .unwrap()
            .ends_with("packages/Orders")
    );
}

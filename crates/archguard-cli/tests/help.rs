use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the archguard binary.
#[allow(deprecated)]
fn archguard_cmd() -> Command {
    Command::cargo_bin("archguard").unwrap()
}

#[test]
fn help_works() {
    archguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("annotations"));
}

#[test]
fn check_help_lists_report_out() {
    archguard_cmd()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--report-out"));
}

#[test]
fn tests_subcommand_lists_known_checks() {
    archguard_cmd()
        .arg("tests")
        .assert()
        .success()
        .stdout(predicate::str::contains("reside_in_namespace"))
        .stdout(predicate::str::contains("have_dependency_on"));
}

//! End-to-end CLI tests against the fixture projects in `tests/fixtures/`.
//!
//! Each fixture holds an `archguard.toml` and a type catalog (single file or directory).

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn archguard_cmd() -> Command {
    Command::cargo_bin("archguard").expect("archguard binary not found - run `cargo build` first")
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("archguard-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("read report");
    serde_json::from_str(&text).expect("parse report json")
}

/// Run `check` on a fixture and return the exit code with the written report.
fn run_check(fixture: &str, extra: &[&str]) -> (i32, Value, TempDir) {
    let temp = TempDir::new().expect("create temp dir");
    let report_path = temp.path().join("report.json");

    let output = archguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join(fixture))
        .args(extra)
        .arg("check")
        .arg("--report-out")
        .arg(&report_path)
        .output()
        .expect("run archguard");

    let code = output.status.code().unwrap_or(-1);
    (code, read_json(&report_path), temp)
}

fn failing_types(report: &Value, policy: usize, rule: usize) -> Vec<String> {
    report["policies"][policy]["rules"][rule]["failing_types"]
        .as_array()
        .expect("failing_types array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect()
}

#[test]
fn layered_violation_fails_with_exit_2() {
    let (code, report, _tmp) = run_check("layered_violation", &[]);
    assert_eq!(code, 2);
    assert_eq!(report["schema"], "archguard.report.v1");
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["data"]["types_scanned"], 4);
    assert_eq!(
        failing_types(&report, 0, 0),
        vec!["App.Presentation.OrderView"]
    );
    assert_eq!(report["policies"][0]["rules"][1]["is_successful"], true);

    let findings = report["findings"].as_array().expect("findings");
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["severity"], "error");
    assert_eq!(
        findings[0]["location"]["path"],
        "src/Presentation/OrderView.cs"
    );
}

#[test]
fn layered_clean_passes() {
    let (code, report, _tmp) = run_check("layered_clean", &[]);
    assert_eq!(code, 0);
    assert_eq!(report["verdict"], "pass");
    assert_eq!(report["findings"].as_array().map(Vec::len), Some(0));
}

#[test]
fn warn_profile_reports_warnings_and_fails_on_them() {
    let (code, report, _tmp) = run_check("layered_violation", &["--profile", "warn"]);
    assert_eq!(code, 2);
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["data"]["profile"], "warn");
    assert_eq!(report["findings"][0]["severity"], "warning");
}

#[test]
fn catalog_directory_is_discovered_recursively() {
    let (code, report, _tmp) = run_check("catalog_dir", &[]);
    assert_eq!(code, 2);
    assert_eq!(report["data"]["types_scanned"], 3);
    assert_eq!(failing_types(&report, 0, 0), vec!["Web.Handler"]);
    assert_eq!(
        report["findings"][0]["location"]["path"],
        "sub/web.types.json"
    );
}

#[test]
fn max_findings_override_truncates_but_still_fails() {
    let (code, report, _tmp) = run_check("catalog_dir", &["--max-findings", "0"]);
    assert_eq!(code, 2);
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["counts"]["error"], 1);
    assert_eq!(report["findings"].as_array().map(Vec::len), Some(0));
    assert_eq!(report["data"]["findings_total"], 1);
    assert!(report["data"]["truncated_reason"].is_string());
}

#[test]
fn missing_catalog_writes_runtime_error_report() {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::copy(
        fixtures_dir().join("layered_violation").join("archguard.toml"),
        temp.path().join("archguard.toml"),
    )
    .expect("copy config");
    let report_path = temp.path().join("out").join("report.json");

    archguard_cmd()
        .arg("--root")
        .arg(temp.path())
        .arg("check")
        .arg("--report-out")
        .arg(&report_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("archguard error"));

    let report = read_json(&report_path);
    assert_eq!(report["verdict"], "fail");
    assert_eq!(report["findings"][0]["check_id"], "tool.runtime");
}

#[test]
fn invalid_config_is_a_runtime_error() {
    let temp = TempDir::new().expect("create temp dir");
    std::fs::write(temp.path().join("archguard.toml"), "profile = \"loud\"\n")
        .expect("write config");

    archguard_cmd()
        .arg("--root")
        .arg(temp.path())
        .arg("check")
        .arg("--report-out")
        .arg(temp.path().join("report.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("loud"));
}

#[test]
fn markdown_and_annotations_render_from_report() {
    let (_code, _report, tmp) = run_check("layered_violation", &[]);
    let report_path = tmp.path().join("report.json");
    let md_path = tmp.path().join("comment.md");

    archguard_cmd()
        .arg("md")
        .arg("--report")
        .arg(&report_path)
        .arg("--output")
        .arg(&md_path)
        .assert()
        .success();
    let md = std::fs::read_to_string(&md_path).expect("read markdown");
    assert!(md.contains("# Archguard report"));
    assert!(md.contains("- [FAIL] `presentation-skips-data`"));

    archguard_cmd()
        .arg("annotations")
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("::error"))
        .stdout(predicate::str::contains("file=src/Presentation/OrderView.cs"));
}

#[test]
fn check_writes_markdown_when_requested() {
    let temp = TempDir::new().expect("create temp dir");
    let md_path = temp.path().join("comment.md");

    archguard_cmd()
        .arg("--root")
        .arg(fixtures_dir().join("layered_clean"))
        .arg("check")
        .arg("--report-out")
        .arg(temp.path().join("report.json"))
        .arg("--write-markdown")
        .arg("--markdown-out")
        .arg(&md_path)
        .assert()
        .success();

    let md = std::fs::read_to_string(&md_path).expect("read markdown");
    assert!(md.contains("Verdict: **PASS**"));
}

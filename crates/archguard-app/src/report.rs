use anyhow::Context;
use archguard_render::{
    RenderableData, RenderableFinding, RenderableLocation, RenderablePolicy, RenderableReport,
    RenderableRule, RenderableSeverity, RenderableVerdictStatus,
};
use archguard_types::{
    ArchguardData, ArchguardReport, Finding, SCHEMA_REPORT_V1, Severity, ToolMeta, Verdict,
    VerdictCounts, ids,
};
use time::OffsetDateTime;

pub fn parse_report_json(text: &str) -> anyhow::Result<ArchguardReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse archguard report")
}

pub fn serialize_report(report: &ArchguardReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

pub fn to_renderable(report: &ArchguardReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Warn => RenderableVerdictStatus::Warn,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        policies: report
            .policies
            .iter()
            .map(|p| RenderablePolicy {
                name: p.name.clone(),
                description: p.description.clone(),
                rules: p
                    .rules
                    .iter()
                    .map(|r| RenderableRule {
                        name: r.name.clone(),
                        description: r.description.clone(),
                        passed: r.is_successful,
                        failing_types: r.failing_types.clone(),
                    })
                    .collect(),
            })
            .collect(),
        findings: report.findings.iter().map(renderable_finding).collect(),
        data: RenderableData {
            types_scanned: report.data.types_scanned,
            rules_evaluated: report.data.rules_evaluated,
            rules_failed: report.data.rules_failed,
            findings_emitted: report.data.findings_emitted,
            findings_total: report.data.findings_total,
            truncated_reason: report.data.truncated_reason.clone(),
        },
    }
}

fn renderable_finding(f: &Finding) -> RenderableFinding {
    RenderableFinding {
        severity: match f.severity {
            Severity::Info => RenderableSeverity::Info,
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        check_id: Some(f.check_id.clone()),
        code: f.code.clone(),
        message: f.message.clone(),
        location: f.location.as_ref().map(|loc| RenderableLocation {
            path: loc.path.as_str().to_string(),
            line: loc.line,
            col: loc.col,
        }),
        help: f.help.clone(),
    }
}

/// A failing report carrying a single `tool.runtime` finding, written when the check could not
/// run at all.
pub fn runtime_error_report(message: &str) -> ArchguardReport {
    let now = OffsetDateTime::now_utc();
    ArchguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "archguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at: now,
        finished_at: now,
        verdict: Verdict::Fail,
        counts: VerdictCounts {
            error: 1,
            ..VerdictCounts::default()
        },
        policies: Vec::new(),
        findings: vec![Finding {
            severity: Severity::Error,
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            location: None,
            help: Some("Fix the tool error and re-run archguard.".to_string()),
            fingerprint: None,
            data: serde_json::Value::Null,
        }],
        data: ArchguardData {
            profile: "unknown".to_string(),
            findings_total: 1,
            findings_emitted: 1,
            ..ArchguardData::default()
        },
    }
}

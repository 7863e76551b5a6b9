use crate::{RenderableReport, RenderableSeverity, RenderableVerdictStatus};

/// Failing types listed per rule before the list is elided.
const MAX_TYPES_PER_RULE: usize = 10;

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();

    out.push_str("# Archguard report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Warn => "WARN",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Types scanned: {}\n- Rules: {} evaluated, {} failed\n- Findings: {} (emitted) / {} (total)\n\n",
        verdict,
        report.data.types_scanned,
        report.data.rules_evaluated,
        report.data.rules_failed,
        report.data.findings_emitted,
        report.data.findings_total
    ));

    if let Some(r) = &report.data.truncated_reason {
        out.push_str(&format!("> Note: {r}\n\n"));
    }

    if !report.policies.is_empty() {
        out.push_str("## Policies\n\n");
    }
    for policy in &report.policies {
        out.push_str(&format!("### {}\n\n", policy.name));
        if let Some(d) = &policy.description {
            out.push_str(&format!("{d}\n\n"));
        }
        if policy.rules.is_empty() {
            out.push_str("No rules.\n\n");
            continue;
        }
        for rule in &policy.rules {
            let mark = if rule.passed { "PASS" } else { "FAIL" };
            match &rule.description {
                Some(d) => out.push_str(&format!("- [{}] `{}`: {}\n", mark, rule.name, d)),
                None => out.push_str(&format!("- [{}] `{}`\n", mark, rule.name)),
            }
            for ty in rule.failing_types.iter().take(MAX_TYPES_PER_RULE) {
                out.push_str(&format!("  - `{ty}`\n"));
            }
            let hidden = rule.failing_types.len().saturating_sub(MAX_TYPES_PER_RULE);
            if hidden > 0 {
                out.push_str(&format!("  - ... and {hidden} more\n"));
            }
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    for f in &report.findings {
        let sev = match f.severity {
            RenderableSeverity::Info => "INFO",
            RenderableSeverity::Warning => "WARN",
            RenderableSeverity::Error => "ERROR",
        };

        let head = format!(
            "- [{}] `{}` / `{}`: {}",
            sev,
            f.check_id.as_deref().unwrap_or(""),
            f.code,
            f.message
        );
        match &f.location {
            Some(loc) => match loc.line {
                Some(line) => out.push_str(&format!("{head} (`{}`:{line})\n", loc.path)),
                None => out.push_str(&format!("{head} (`{}`)\n", loc.path)),
            },
            None => {
                out.push_str(&head);
                out.push('\n');
            }
        }

        if let Some(help) = &f.help {
            out.push_str(&format!("  - help: {help}\n"));
        }
    }

    out
}

use crate::config::{EffectiveConfig, FailOn};
use crate::fingerprint::fingerprint_for_violation;
use crate::policy::{PolicyResult, PolicyResults};
use crate::report::{DomainReport, SeverityCounts};
use archguard_types::ids::{CHECK_ARCH_RULE, CODE_RULE_VIOLATION};
use archguard_types::{
    ArchguardData, Finding, Location, PolicyOutcome, RuleOutcome, Severity, TypeDescriptor,
    Verdict,
};
use std::sync::Arc;

/// Turn evaluated policies into findings, counts, and a verdict.
///
/// Every failing type of every enabled rule becomes one finding. Disabled rules are reported
/// in the policy outcomes but produce no findings.
pub fn evaluate_policies(policies: &[Arc<PolicyResults>], cfg: &EffectiveConfig) -> DomainReport {
    let mut findings: Vec<Finding> = Vec::new();
    let mut outcomes = Vec::with_capacity(policies.len());
    let mut rules_evaluated = 0u32;
    let mut rules_failed = 0u32;
    let mut types_scanned = 0usize;

    for policy in policies {
        types_scanned = types_scanned.max(policy.types_scanned());
        for rule in policy.results() {
            let Some(rule_policy) = cfg.rule_policy(policy.name(), &rule.name) else {
                tracing::debug!(policy = policy.name(), rule = %rule.name, "rule disabled");
                continue;
            };
            rules_evaluated += 1;
            if !rule.result.is_successful() {
                rules_failed += 1;
            }
            for ty in rule.result.failing_types() {
                findings.push(violation(policy, rule, ty, rule_policy.severity));
            }
        }
        outcomes.push(outcome(policy));
    }

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    let total = findings.len() as u32;
    // Truncation limits what is emitted, never what is judged.
    let verdict = compute_verdict(&findings, cfg.fail_on);
    let counts = SeverityCounts::from_findings(&findings);

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let data = ArchguardData {
        profile: cfg.profile.clone(),
        types_scanned: types_scanned as u32,
        rules_evaluated,
        rules_failed,
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
        counts,
        policies: outcomes,
    }
}

fn violation(
    policy: &PolicyResults,
    rule: &PolicyResult,
    ty: &TypeDescriptor,
    severity: Severity,
) -> Finding {
    let message = format!(
        "type '{}' violates rule '{}' of policy '{}'",
        ty.full_name,
        rule.name,
        policy.name()
    );
    Finding {
        severity,
        check_id: CHECK_ARCH_RULE.to_string(),
        code: CODE_RULE_VIOLATION.to_string(),
        message,
        location: ty.source.clone().map(|path| Location {
            path,
            line: None,
            col: None,
        }),
        help: rule.description.clone(),
        fingerprint: Some(fingerprint_for_violation(
            CHECK_ARCH_RULE,
            CODE_RULE_VIOLATION,
            policy.name(),
            &rule.name,
            &ty.full_name,
        )),
        data: serde_json::json!({
            "policy": policy.name(),
            "rule": rule.name,
            "type": ty.full_name,
            "namespace": ty.namespace,
        }),
    }
}

fn outcome(policy: &PolicyResults) -> PolicyOutcome {
    PolicyOutcome {
        name: policy.name().to_string(),
        description: policy.description().map(str::to_string),
        has_violations: policy.has_violations(),
        rules: policy
            .results()
            .iter()
            .map(|r| RuleOutcome {
                name: r.name.clone(),
                description: r.description.clone(),
                is_successful: r.result.is_successful(),
                failing_types: r
                    .result
                    .failing_type_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect(),
    }
}

fn compute_verdict(findings: &[Finding], fail_on: FailOn) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    if has_error {
        return Verdict::Fail;
    }

    let has_warn = findings.iter().any(|f| f.severity == Severity::Warning);
    if has_warn {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Error => Verdict::Warn,
        };
    }

    Verdict::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) location.path (missing last)
    // 3) check_id
    // 4) code
    // 5) message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let ap = a.location.as_ref().map_or("~", |l| l.path.as_str());
    let bp = b.location.as_ref().map_or("~", |l| l.path.as_str());

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(ap.cmp(bp))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.message.cmp(&b.message))
}

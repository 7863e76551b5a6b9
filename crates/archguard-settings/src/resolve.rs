use crate::{model::ArchguardConfigV1, presets, rules};
use anyhow::{Context, bail};
use archguard_domain::Rule;
use archguard_domain::config::{EffectiveConfig, FailOn, RulePolicy, rule_key};
use archguard_types::Severity;
use std::collections::BTreeSet;

pub const DEFAULT_CATALOG: &str = "types.json";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub max_findings: Option<u32>,
    pub catalog: Option<String>,
}

/// A policy ready to be bound to a type source.
#[derive(Clone, Debug)]
pub struct PolicyDefinition {
    pub name: String,
    pub description: Option<String>,
    /// Enabled rules only, in declaration order.
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    pub catalog: String,
    pub namespaces: Vec<String>,
    pub policies: Vec<PolicyDefinition>,
}

pub fn resolve_config(
    cfg: ArchguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile)?;

    // max findings
    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    // fail_on override from config
    if let Some(fail_on_s) = cfg.fail_on.as_deref() {
        effective.fail_on = parse_fail_on(fail_on_s)?;
    }

    let mut policy_names = BTreeSet::new();
    let mut policies = Vec::with_capacity(cfg.policies.len());
    for pc in &cfg.policies {
        if pc.name.trim().is_empty() {
            bail!("every [[policies]] entry needs a name");
        }
        if !policy_names.insert(pc.name.as_str()) {
            bail!("duplicate policy name: {}", pc.name);
        }

        let mut rule_names = BTreeSet::new();
        let mut compiled = Vec::with_capacity(pc.rules.len());
        for rc in &pc.rules {
            if !rule_names.insert(rc.name.as_str()) {
                bail!("duplicate rule name in policy '{}': {}", pc.name, rc.name);
            }

            let rule = rules::compile_rule(&pc.name, rc)?;
            let enabled = rc.enabled.unwrap_or(true);
            let severity = match rc.severity.as_deref() {
                Some(sev) => parse_severity(sev).with_context(|| {
                    format!("invalid severity for {}", rule_key(&pc.name, &rc.name))
                })?,
                None => effective.default_severity,
            };

            effective.rules.insert(
                rule_key(&pc.name, &rc.name),
                if enabled {
                    RulePolicy::enabled(severity)
                } else {
                    RulePolicy::disabled()
                },
            );
            if enabled {
                compiled.push(rule);
            }
        }

        policies.push(PolicyDefinition {
            name: pc.name.clone(),
            description: pc.description.clone(),
            rules: compiled,
        });
    }

    let catalog = overrides
        .catalog
        .or(cfg.catalog)
        .unwrap_or_else(|| DEFAULT_CATALOG.to_string());

    Ok(ResolvedConfig {
        effective,
        catalog,
        namespaces: cfg.namespaces,
        policies,
    })
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    match v {
        "info" => Ok(Severity::Info),
        "warning" | "warn" => Ok(Severity::Warning),
        "error" => Ok(Severity::Error),
        other => anyhow::bail!("unknown severity: {other} (expected info|warning|error)"),
    }
}

fn parse_fail_on(v: &str) -> anyhow::Result<FailOn> {
    match v {
        "error" => Ok(FailOn::Error),
        "warning" | "warn" => Ok(FailOn::Warning),
        other => anyhow::bail!("unknown fail_on: {other} (expected error|warning)"),
    }
}

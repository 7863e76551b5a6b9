use archguard_domain::config::{EffectiveConfig, FailOn};
use archguard_types::Severity;
use std::collections::BTreeMap;

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> anyhow::Result<EffectiveConfig> {
    match profile {
        "strict" => Ok(strict_profile()),
        "warn" => Ok(warn_profile()),
        other => anyhow::bail!("unknown profile: {other} (expected 'strict' or 'warn')"),
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: FailOn::Error,
        max_findings: 200,
        default_severity: Severity::Error,
        rules: BTreeMap::new(),
    }
}

fn warn_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "warn".to_string(),
        fail_on: FailOn::Warning,
        max_findings: 200,
        default_severity: Severity::Warning,
        rules: BTreeMap::new(),
    }
}

use archguard_types::Severity;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailOn {
    Error,
    Warning,
}

/// Per-rule overrides resolved from configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulePolicy {
    pub enabled: bool,
    pub severity: Severity,
}

impl RulePolicy {
    pub fn enabled(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: Severity::Info,
        }
    }
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: FailOn,
    pub max_findings: usize,
    /// Severity for violations of rules with no entry in `rules`.
    pub default_severity: Severity,
    /// Keyed by [`rule_key`].
    pub rules: BTreeMap<String, RulePolicy>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "strict".to_string(),
            fail_on: FailOn::Error,
            max_findings: 200,
            default_severity: Severity::Error,
            rules: BTreeMap::new(),
        }
    }
}

impl EffectiveConfig {
    /// Effective policy for a rule, or `None` when the rule is disabled.
    pub fn rule_policy(&self, policy: &str, rule: &str) -> Option<RulePolicy> {
        match self.rules.get(&rule_key(policy, rule)) {
            Some(p) if p.enabled => Some(p.clone()),
            Some(_) => None,
            None => Some(RulePolicy::enabled(self.default_severity)),
        }
    }
}

pub fn rule_key(policy: &str, rule: &str) -> String {
    format!("{policy}/{rule}")
}

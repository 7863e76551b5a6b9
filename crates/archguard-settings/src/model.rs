use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `archguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArchguardConfigV1 {
    /// Optional schema string for tooling (`archguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict` (default) or `warn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// When to fail the check: `error` or `warning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// How many findings to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    /// Type catalog to evaluate: a `.json` file or a directory of `*.types.json` files,
    /// relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Keep only catalog types in these namespaces (and their children).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,

    #[serde(default)]
    pub policies: Vec<PolicyConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Disable without deleting the rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Override the profile severity: `info`, `warning`, `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Glob patterns over type full names exempt from this rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,

    /// Predicates selecting the types the rule applies to. Empty selects every type.
    #[serde(default)]
    pub that: Vec<TermConfig>,

    /// Conditions the selected types must satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should: Option<Vec<TermConfig>>,

    /// Conditions the selected types must not satisfy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_not: Option<Vec<TermConfig>>,
}

/// One check in a predicate or condition list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TermConfig {
    /// Check name, e.g. `reside_in_namespace`, `be_sealed`, `have_dependency_on`.
    pub test: String,

    /// How this term joins the running result: `and` (default) or `or`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<String>,

    /// Negate this term only.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub not: bool,

    /// Argument for name, namespace, attribute, and inheritance checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Dependency targets matched as namespaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,

    /// Dependency targets matched as exact type names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// Dependency targets matched as a type name or a namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,

    /// Do not count the type's reference to itself.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude_self: bool,
}

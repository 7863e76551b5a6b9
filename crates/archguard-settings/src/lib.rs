//! Config parsing, profile presets, and declarative rule resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;
mod rules;

pub use model::{ArchguardConfigV1, PolicyConfig, RuleConfig, TermConfig};
pub use resolve::{DEFAULT_CATALOG, Overrides, PolicyDefinition, ResolvedConfig};
pub use rules::{KNOWN_TESTS, compile_expression, compile_rule};

/// Parse `archguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ArchguardConfigV1> {
    let cfg: ArchguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the engine (profiles + overrides + compiled policies).
pub fn resolve_config(
    cfg: ArchguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

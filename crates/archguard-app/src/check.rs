//! The `check` use case: resolve config, bind policies to the type catalog, evaluate, report.

use anyhow::Context;
use archguard_catalog::{CatalogSource, load_types};
use archguard_domain::{Conditions, Policy, TypeCatalog, evaluate_policies};
use archguard_settings::{Overrides, PolicyDefinition, ResolvedConfig};
use archguard_types::{ArchguardReport, SCHEMA_REPORT_V1, ToolMeta, Verdict};
use camino::Utf8Path;
use std::sync::{Arc, OnceLock};
use time::OffsetDateTime;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Directory relative paths in the config (such as `catalog`) are resolved against.
    pub root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    /// The generated report.
    pub report: ArchguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Loads the catalog on first use and hands every policy the same snapshot.
struct SharedCatalog {
    source: CatalogSource,
    namespaces: Vec<String>,
    loaded: OnceLock<Result<TypeCatalog, String>>,
}

impl SharedCatalog {
    fn get(&self) -> Result<TypeCatalog, String> {
        self.loaded
            .get_or_init(|| {
                tracing::info!(catalog = %self.source.path(), "loading type catalog");
                load_types(&self.source, &self.namespaces)
                    .map(TypeCatalog::new)
                    .map_err(|e| format!("{e:#}"))
            })
            .clone()
    }
}

/// Run the check use case: parse config, build policies, evaluate them, produce a report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        archguard_settings::ArchguardConfigV1::default()
    } else {
        archguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved = archguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let shared = Arc::new(SharedCatalog {
        source: CatalogSource::detect(input.root.join(&resolved.catalog)),
        namespaces: resolved.namespaces.clone(),
        loaded: OnceLock::new(),
    });
    let policies = build_policies(&resolved.policies, move || shared.get())?;

    let mut results = Vec::with_capacity(policies.len());
    for policy in &policies {
        let r = policy
            .evaluate()
            .with_context(|| format!("evaluate policy '{}'", policy.name()))?;
        results.push(r);
    }

    let domain = evaluate_policies(&results, &resolved.effective);
    tracing::info!(
        verdict = ?domain.verdict,
        findings = domain.data.findings_total,
        "check finished"
    );

    let report = ArchguardReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "archguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict: domain.verdict,
        counts: domain.counts.into(),
        policies: domain.policies,
        findings: domain.findings,
        data: domain.data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Bind declarative policy definitions to a type source.
///
/// Each policy gets its own copy of `source`; the source is only called when a policy is
/// evaluated.
pub fn build_policies<S>(definitions: &[PolicyDefinition], source: S) -> anyhow::Result<Vec<Policy>>
where
    S: Fn() -> Result<TypeCatalog, String> + Clone + Send + 'static,
{
    let mut out = Vec::with_capacity(definitions.len());
    for def in definitions {
        let source = source.clone();
        let mut policy =
            Policy::define(def.name.clone(), def.description.clone().unwrap_or_default());
        policy.for_types(move || source())?;
        for rule in &def.rules {
            let name = rule.name().unwrap_or_default().to_string();
            let description = rule.description().unwrap_or_default().to_string();
            let rule = rule.clone();
            policy.add(
                move |types| Conditions::from_rule(types, &rule),
                name,
                description,
            )?;
        }
        out.push(policy);
    }
    Ok(out)
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TYPES: &str = r#"{
      "module": "App",
      "types": [
        { "full_name": "App.Data.OrderRepository", "is_sealed": true,
          "fields": [ { "name": "rows", "type": "App.Data.OrderRow[]" } ] },
        { "full_name": "App.Data.OrderRow", "is_sealed": true },
        { "full_name": "App.Presentation.OrderView",
          "fields": [ { "name": "repo", "type": "App.Data.OrderRepository" } ] },
        { "full_name": "App.Presentation.LegacyGrid",
          "methods": [ { "name": "Load", "locals": [ "App.Data.OrderRow[]" ] } ] },
        { "full_name": "App.Presentation.Theme", "is_sealed": true,
          "fields": [ { "name": "name", "type": "System.String" } ] }
      ]
    }"#;

    const CONFIG: &str = r#"
[[policies]]
name = "layers"

[[policies.rules]]
name = "presentation-skips-data"
that = [{ test = "reside_in_namespace", value = "App.Presentation" }]
should_not = [{ test = "have_dependency_on", namespaces = ["App.Data"] }]

[[policies.rules]]
name = "data-sealed"
that = [{ test = "reside_in_namespace", value = "App.Data" }]
should = [{ test = "be_sealed" }]
"#;

    fn workspace(types: Option<&str>) -> (tempfile::TempDir, Utf8PathBuf) {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        if let Some(types) = types {
            std::fs::write(root.join("types.json"), types).expect("write types.json");
        }
        (tmp, root)
    }

    #[test]
    fn layered_catalog_fails_on_presentation_to_data() {
        let (_tmp, root) = workspace(Some(TYPES));
        let output = run_check(CheckInput {
            root: &root,
            config_text: CONFIG,
            overrides: Overrides::default(),
        })
        .expect("run_check");

        let report = output.report;
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.data.types_scanned, 5);
        assert_eq!(report.policies.len(), 1);
        let rules = &report.policies[0].rules;
        assert_eq!(
            rules[0].failing_types,
            vec!["App.Presentation.OrderView", "App.Presentation.LegacyGrid"]
        );
        assert!(rules[1].is_successful);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(
            report.findings[0]
                .location
                .as_ref()
                .map(|l| l.path.as_str()),
            Some("types.json")
        );
    }

    #[test]
    fn empty_config_uses_defaults_and_never_loads_the_catalog() {
        let (_tmp, root) = workspace(None);
        let output = run_check(CheckInput {
            root: &root,
            config_text: "",
            overrides: Overrides::default(),
        })
        .expect("run_check");
        assert_eq!(output.resolved_config.effective.profile, "strict");
        assert_eq!(output.report.verdict, Verdict::Pass);
        assert_eq!(output.report.data.types_scanned, 0);
    }

    #[test]
    fn missing_catalog_is_an_error_once_a_policy_needs_it() {
        let (_tmp, root) = workspace(None);
        let err = run_check(CheckInput {
            root: &root,
            config_text: CONFIG,
            overrides: Overrides::default(),
        })
        .expect_err("missing catalog");
        let msg = format!("{err:#}");
        assert!(msg.contains("evaluate policy 'layers'"), "{msg}");
        assert!(msg.contains("types.json"), "{msg}");
    }

    #[test]
    fn policies_share_one_source_invocation_per_policy() {
        let defs = archguard_settings::resolve_config(
            archguard_settings::parse_config_toml(CONFIG).expect("parse"),
            Overrides::default(),
        )
        .expect("resolve")
        .policies;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let policies = build_policies(&defs, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TypeCatalog::empty())
        })
        .expect("build");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        for policy in &policies {
            policy.evaluate().expect("evaluate");
            policy.evaluate().expect("evaluate again");
        }
        assert_eq!(calls.load(Ordering::SeqCst), policies.len());
        assert_eq!(policies[0].rule_count(), 2);
    }

    #[test]
    fn verdict_exit_codes() {
        assert_eq!(verdict_exit_code(Verdict::Pass), 0);
        assert_eq!(verdict_exit_code(Verdict::Warn), 0);
        assert_eq!(verdict_exit_code(Verdict::Fail), 2);
    }
}

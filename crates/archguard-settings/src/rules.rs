//! Declarative rules: `[[policies.rules]]` tables compiled into engine rules.

use crate::model::{RuleConfig, TermConfig};
use anyhow::{Context, bail};
use archguard_domain::{
    AllowList, Conjunction, DependencyCheck, DependencyTarget, Expression, MatchMode, Pattern,
    Polarity, Rule, TypeCheck,
};
use archguard_types::TypeKind;

/// Check names accepted in `test = "..."`.
pub const KNOWN_TESTS: &[&str] = &[
    "have_name",
    "have_name_starting_with",
    "have_name_ending_with",
    "have_name_matching",
    "have_full_name",
    "reside_in_namespace",
    "reside_in_namespace_matching",
    "reside_in_namespace_starting_with",
    "reside_in_namespace_ending_with",
    "have_custom_attribute",
    "inherit",
    "implement_interface",
    "be_classes",
    "be_interfaces",
    "be_structs",
    "be_enums",
    "be_abstract",
    "be_sealed",
    "be_public",
    "be_static",
    "be_nested",
    "be_generic",
    "be_immutable",
    "have_dependency_on",
    "have_dependency_on_all",
    "only_have_dependency_on",
];

pub fn compile_rule(policy: &str, cfg: &RuleConfig) -> anyhow::Result<Rule> {
    let ctx = || format!("rule '{}' in policy '{policy}'", cfg.name);

    if cfg.name.trim().is_empty() {
        bail!("policy '{policy}' has a rule without a name");
    }

    let (polarity, condition_terms) = match (&cfg.should, &cfg.should_not) {
        (Some(terms), None) => (Polarity::Should, terms),
        (None, Some(terms)) => (Polarity::ShouldNot, terms),
        (Some(_), Some(_)) => bail!("{}: set only one of `should` and `should_not`", ctx()),
        (None, None) => bail!("{}: one of `should` or `should_not` is required", ctx()),
    };

    let predicates = compile_expression(&cfg.that).with_context(|| format!("{}: that", ctx()))?;
    let conditions = compile_expression(condition_terms).with_context(|| {
        let field = match polarity {
            Polarity::Should => "should",
            Polarity::ShouldNot => "should_not",
        };
        format!("{}: {field}", ctx())
    })?;

    let mut rule = Rule::new(predicates, conditions, polarity)
        .named(cfg.name.clone(), cfg.description.clone());
    if !cfg.allow.is_empty() {
        let allow = AllowList::new(&cfg.allow)
            .with_context(|| format!("invalid allow glob for {}", ctx()))?;
        rule = rule.with_allow(allow);
    }
    Ok(rule)
}

pub fn compile_expression(terms: &[TermConfig]) -> anyhow::Result<Expression> {
    let mut expr = Expression::new();
    for (i, term) in terms.iter().enumerate() {
        let conjunction = parse_join(term.join.as_deref()).with_context(|| format!("term {i}"))?;
        let check = compile_check(term).with_context(|| format!("term {i} ({})", term.test))?;
        expr.push(conjunction, check, term.not);
    }
    Ok(expr)
}

fn compile_check(term: &TermConfig) -> anyhow::Result<TypeCheck> {
    let check = match term.test.as_str() {
        "have_name" => TypeCheck::HaveName(value(term)?),
        "have_name_starting_with" => TypeCheck::HaveNameStartingWith(value(term)?),
        "have_name_ending_with" => TypeCheck::HaveNameEndingWith(value(term)?),
        "have_name_matching" => TypeCheck::HaveNameMatching(pattern(term)?),
        "have_full_name" => TypeCheck::HaveFullName(value(term)?),
        "reside_in_namespace" => TypeCheck::ResideInNamespace(value(term)?),
        "reside_in_namespace_matching" => TypeCheck::ResideInNamespaceMatching(pattern(term)?),
        "reside_in_namespace_starting_with" => {
            TypeCheck::ResideInNamespaceStartingWith(value(term)?)
        }
        "reside_in_namespace_ending_with" => TypeCheck::ResideInNamespaceEndingWith(value(term)?),
        "have_custom_attribute" => TypeCheck::HaveCustomAttribute(value(term)?),
        "inherit" => TypeCheck::Inherit(value(term)?),
        "implement_interface" => TypeCheck::ImplementInterface(value(term)?),
        "be_classes" => TypeCheck::HaveKind(TypeKind::Class),
        "be_interfaces" => TypeCheck::HaveKind(TypeKind::Interface),
        "be_structs" => TypeCheck::HaveKind(TypeKind::Struct),
        "be_enums" => TypeCheck::HaveKind(TypeKind::Enum),
        "be_abstract" => TypeCheck::AreAbstract,
        "be_sealed" => TypeCheck::AreSealed,
        "be_public" => TypeCheck::ArePublic,
        "be_static" => TypeCheck::AreStatic,
        "be_nested" => TypeCheck::AreNested,
        "be_generic" => TypeCheck::AreGeneric,
        "be_immutable" => TypeCheck::AreImmutable,
        "have_dependency_on" => dependency(term, MatchMode::Any)?,
        "have_dependency_on_all" => dependency(term, MatchMode::All)?,
        "only_have_dependency_on" => dependency(term, MatchMode::Only)?,
        other => bail!(
            "unknown test: {other} (expected one of: {})",
            KNOWN_TESTS.join(", ")
        ),
    };
    Ok(check)
}

fn value(term: &TermConfig) -> anyhow::Result<String> {
    match term.value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => bail!("`{}` requires a non-empty `value`", term.test),
    }
}

fn pattern(term: &TermConfig) -> anyhow::Result<Pattern> {
    let v = value(term)?;
    Ok(Pattern::new(&v)?)
}

fn dependency(term: &TermConfig, mode: MatchMode) -> anyhow::Result<TypeCheck> {
    let targets: Vec<DependencyTarget> = term
        .namespaces
        .iter()
        .cloned()
        .map(DependencyTarget::Namespace)
        .chain(term.types.iter().cloned().map(DependencyTarget::Type))
        .chain(term.names.iter().cloned().map(DependencyTarget::Name))
        .chain(term.value.iter().cloned().map(DependencyTarget::Name))
        .collect();
    if targets.is_empty() {
        bail!(
            "`{}` requires at least one target in `namespaces`, `types`, `names`, or `value`",
            term.test
        );
    }

    let mut check = DependencyCheck::new(targets, mode);
    if term.exclude_self {
        check = check.excluding_self();
    }
    Ok(TypeCheck::HaveDependency(check))
}

fn parse_join(v: Option<&str>) -> anyhow::Result<Conjunction> {
    match v {
        None | Some("and") => Ok(Conjunction::And),
        Some("or") => Ok(Conjunction::Or),
        Some(other) => bail!("unknown join: {other} (expected 'and' or 'or')"),
    }
}

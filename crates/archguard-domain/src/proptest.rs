//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify laws around:
//! - filtering (ordered subsequence, identity, negation)
//! - should / should-not duality and empty selections
//! - self-references in namespace dependencies
//! - findings ordering determinism

use crate::builder::{CheckChain, Types};
use crate::checks::TypeCheck;
use crate::config::EffectiveConfig;
use crate::engine::evaluate_policies;
use crate::expr::{Conjunction, Expression};
use crate::error::PolicyError;
use crate::policy::{Policy, PolicyResults};
use crate::rule::{Polarity, Rule};
use crate::snapshot::TypeCatalog;
use archguard_types::{FieldDescriptor, TypeDescriptor, TypeRef};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Strategies
// ============================================================================

const NAMESPACES: &[&str] = &[
    "App",
    "App.Data",
    "App.Data.Sql",
    "App.Presentation",
    "App.Services",
    "Vendor.Grid",
];

fn arb_namespace() -> impl Strategy<Value = String> {
    prop::sample::select(NAMESPACES).prop_map(str::to_string)
}

fn arb_type() -> impl Strategy<Value = TypeDescriptor> {
    (
        arb_namespace(),
        prop::string::string_regex("[A-Z][a-z]{1,6}").unwrap(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop::collection::vec(arb_namespace(), 0..3),
    )
        .prop_map(|(ns, name, sealed, public, is_abstract, field_namespaces)| {
            let mut ty = TypeDescriptor::new(format!("{ns}.{name}"));
            ty.is_sealed = sealed;
            ty.is_public = public;
            ty.is_abstract = is_abstract;
            ty.fields = field_namespaces
                .into_iter()
                .enumerate()
                .map(|(i, ns)| FieldDescriptor {
                    name: format!("f{i}"),
                    field_type: TypeRef::new(format!("{ns}.Thing")),
                    ..FieldDescriptor::default()
                })
                .collect();
            ty
        })
}

/// Catalog with unique full names, so that duplicates collapsing does not blur order checks.
fn arb_catalog() -> impl Strategy<Value = TypeCatalog> {
    prop::collection::vec(arb_type(), 0..12).prop_map(|types| {
        let mut seen = std::collections::BTreeSet::new();
        TypeCatalog::new(
            types
                .into_iter()
                .filter(|t| seen.insert(t.full_name.clone()))
                .collect(),
        )
    })
}

fn arb_check() -> impl Strategy<Value = TypeCheck> {
    prop_oneof![
        Just(TypeCheck::AreSealed),
        Just(TypeCheck::ArePublic),
        Just(TypeCheck::AreAbstract),
        arb_namespace().prop_map(TypeCheck::ResideInNamespace),
        arb_namespace().prop_map(|ns| TypeCheck::HaveDependency(
            crate::dependency::DependencyCheck::any([ns.as_str()])
        )),
    ]
}

fn arb_conjunction() -> impl Strategy<Value = Conjunction> {
    prop_oneof![Just(Conjunction::And), Just(Conjunction::Or)]
}

fn arb_expression() -> impl Strategy<Value = Expression> {
    prop::collection::vec((arb_conjunction(), arb_check(), any::<bool>()), 0..5).prop_map(
        |terms| {
            terms
                .into_iter()
                .fold(Expression::new(), |expr, (c, check, negate)| {
                    expr.with(c, check, negate)
                })
        },
    )
}

fn full_names(types: &[Arc<TypeDescriptor>]) -> Vec<String> {
    types.iter().map(|t| t.full_name.clone()).collect()
}

fn is_ordered_subsequence(sub: &[String], full: &[String]) -> bool {
    let mut it = full.iter();
    sub.iter().all(|s| it.any(|f| f == s))
}

// ============================================================================
// Laws
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn filter_returns_an_ordered_subsequence(catalog in arb_catalog(), expr in arb_expression()) {
        let all = full_names(catalog.as_slice());
        let out = full_names(&expr.filter(catalog.as_slice(), &catalog));
        prop_assert!(is_ordered_subsequence(&out, &all));
    }

    #[test]
    fn empty_expression_is_identity(catalog in arb_catalog()) {
        let out = Expression::new().filter(catalog.as_slice(), &catalog);
        prop_assert_eq!(full_names(&out), full_names(catalog.as_slice()));
    }

    #[test]
    fn negated_check_selects_the_complement(catalog in arb_catalog(), check in arb_check()) {
        let plain = Expression::new().with(Conjunction::None, check.clone(), false);
        let negated = Expression::new().with(Conjunction::None, check, true);

        let mut union = full_names(&plain.filter(catalog.as_slice(), &catalog));
        let excluded = full_names(&negated.filter(catalog.as_slice(), &catalog));
        prop_assert!(union.iter().all(|n| !excluded.contains(n)));

        union.extend(excluded);
        union.sort();
        let mut all = full_names(catalog.as_slice());
        all.sort();
        prop_assert_eq!(union, all);
    }

    #[test]
    fn or_of_two_checks_is_their_union(catalog in arb_catalog(), a in arb_check(), b in arb_check()) {
        let expr = Expression::new()
            .with(Conjunction::None, a.clone(), false)
            .with(Conjunction::Or, b.clone(), false);
        for ty in catalog.iter() {
            prop_assert_eq!(
                expr.evaluate(ty, &catalog),
                a.matches(ty, &catalog) || b.matches(ty, &catalog)
            );
        }
    }

    #[test]
    fn should_and_should_not_partition_the_selection(
        catalog in arb_catalog(),
        predicates in arb_expression(),
        conditions in arb_expression(),
    ) {
        let should = Rule::new(predicates.clone(), conditions.clone(), Polarity::Should)
            .evaluate(&catalog);
        let should_not = Rule::new(predicates, conditions, Polarity::ShouldNot)
            .evaluate(&catalog);

        prop_assert_eq!(should.selected(), should_not.selected());
        let a = full_names(should.failing_types());
        let b = full_names(should_not.failing_types());
        prop_assert!(a.iter().all(|n| !b.contains(n)));
        prop_assert_eq!(a.len() + b.len(), should.selected());
    }

    #[test]
    fn empty_selection_always_passes(catalog in arb_catalog(), conditions in arb_expression()) {
        let nothing = Expression::new()
            .with(Conjunction::None, TypeCheck::ResideInNamespace("Nowhere".into()), false);
        for polarity in [Polarity::Should, Polarity::ShouldNot] {
            let result = Rule::new(nothing.clone(), conditions.clone(), polarity).evaluate(&catalog);
            prop_assert!(result.is_successful());
            prop_assert_eq!(result.selected(), 0);
        }
    }

    #[test]
    fn types_depend_on_their_own_namespace_unless_excluded(ns in arb_namespace()) {
        let catalog = TypeCatalog::new(vec![TypeDescriptor::new(format!("{ns}.Lonely"))]);

        let counted = Types::from_catalog(catalog.clone())
            .should()
            .have_dependency_on(ns.as_str())
            .get_result();
        prop_assert!(counted.is_successful());

        let excluded = Types::from_catalog(catalog)
            .should()
            .have_dependency(crate::dependency::DependencyCheck::any([ns.as_str()]).excluding_self())
            .get_result();
        prop_assert!(!excluded.is_successful());
    }

    #[test]
    fn findings_order_is_independent_of_policy_order(catalog in arb_catalog()) {
        let build = |name: &str| -> Result<Arc<PolicyResults>, PolicyError> {
            let mut policy = Policy::define(name, "");
            policy
                .for_catalog(catalog.clone())?
                .add(|t| t.should().be_sealed(), "sealed", "")?;
            policy.evaluate()
        };
        let (Ok(a), Ok(b)) = (build("a"), build("b")) else {
            return Err(TestCaseError::fail("policy evaluation failed"));
        };

        let cfg = EffectiveConfig::default();
        let forward = evaluate_policies(&[a.clone(), b.clone()], &cfg);
        let backward = evaluate_policies(&[b, a], &cfg);
        prop_assert_eq!(forward.findings, backward.findings);
    }
}

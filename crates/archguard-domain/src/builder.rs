//! Fluent rule builder.
//!
//! Every step consumes the builder and returns a new value; nothing is shared between chains.
//!
//! ```
//! use archguard_domain::prelude::*;
//! use archguard_types::TypeDescriptor;
//!
//! let mut repo = TypeDescriptor::new("App.Data.OrderRepository");
//! repo.is_sealed = true;
//!
//! let result = Types::from_types(vec![repo])
//!     .that()
//!     .reside_in_namespace("App.Data")
//!     .and()
//!     .have_name_ending_with("Repository")
//!     .should()
//!     .be_sealed()
//!     .get_result();
//! assert!(result.is_successful());
//! ```

use crate::checks::{CustomRule, TypeCheck};
use crate::dependency::{DependencyCheck, DependencyTarget};
use crate::expr::{Conjunction, Expression};
use crate::pattern::{AllowList, Pattern};
use crate::rule::{Polarity, Rule, TestResult};
use crate::snapshot::TypeCatalog;
use archguard_types::{TypeDescriptor, TypeKind};
use std::sync::Arc;

/// Entry point: the set of types rules are written against.
#[derive(Clone, Debug, Default)]
pub struct Types {
    catalog: TypeCatalog,
}

impl Types {
    pub fn from_catalog(catalog: TypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn from_types(types: Vec<TypeDescriptor>) -> Self {
        Self::from_catalog(TypeCatalog::new(types))
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Start a predicate chain selecting which types the rule applies to.
    pub fn that(self) -> Predicates {
        Predicates {
            catalog: self.catalog,
            expression: Expression::new(),
            pending: Pending::default(),
        }
    }

    /// Assert on every type.
    pub fn should(self) -> Conditions {
        self.that().should()
    }

    /// Assert on every type, negated.
    pub fn should_not(self) -> Conditions {
        self.that().should_not()
    }

    pub fn get_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.catalog.as_slice().to_vec()
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Pending {
    conjunction: Conjunction,
    negate: bool,
}

/// Builder operations shared by predicate and condition chains.
///
/// Checks chained without an explicit [`and`](CheckChain::and) or [`or`](CheckChain::or) are
/// joined with AND.
pub trait CheckChain: Sized {
    /// Append `check`, consuming any pending conjunction and negation.
    fn check(self, check: TypeCheck) -> Self;

    /// Join the next check with `conjunction`.
    fn join(self, conjunction: Conjunction) -> Self;

    /// Negate the next check only.
    fn not(self) -> Self;

    fn and(self) -> Self {
        self.join(Conjunction::And)
    }

    fn or(self) -> Self {
        self.join(Conjunction::Or)
    }

    fn have_name(self, name: impl Into<String>) -> Self {
        self.check(TypeCheck::HaveName(name.into()))
    }

    fn have_name_starting_with(self, prefix: impl Into<String>) -> Self {
        self.check(TypeCheck::HaveNameStartingWith(prefix.into()))
    }

    fn have_name_ending_with(self, suffix: impl Into<String>) -> Self {
        self.check(TypeCheck::HaveNameEndingWith(suffix.into()))
    }

    fn have_name_matching(self, pattern: Pattern) -> Self {
        self.check(TypeCheck::HaveNameMatching(pattern))
    }

    fn have_full_name(self, full_name: impl Into<String>) -> Self {
        self.check(TypeCheck::HaveFullName(full_name.into()))
    }

    fn reside_in_namespace(self, namespace: impl Into<String>) -> Self {
        self.check(TypeCheck::ResideInNamespace(namespace.into()))
    }

    fn reside_in_namespace_matching(self, pattern: Pattern) -> Self {
        self.check(TypeCheck::ResideInNamespaceMatching(pattern))
    }

    fn reside_in_namespace_starting_with(self, prefix: impl Into<String>) -> Self {
        self.check(TypeCheck::ResideInNamespaceStartingWith(prefix.into()))
    }

    fn reside_in_namespace_ending_with(self, suffix: impl Into<String>) -> Self {
        self.check(TypeCheck::ResideInNamespaceEndingWith(suffix.into()))
    }

    fn have_custom_attribute(self, attribute: impl Into<String>) -> Self {
        self.check(TypeCheck::HaveCustomAttribute(attribute.into()))
    }

    fn inherit(self, base: impl Into<String>) -> Self {
        self.check(TypeCheck::Inherit(base.into()))
    }

    fn implement_interface(self, interface: impl Into<String>) -> Self {
        self.check(TypeCheck::ImplementInterface(interface.into()))
    }

    fn be_classes(self) -> Self {
        self.check(TypeCheck::HaveKind(TypeKind::Class))
    }

    fn be_interfaces(self) -> Self {
        self.check(TypeCheck::HaveKind(TypeKind::Interface))
    }

    fn be_structs(self) -> Self {
        self.check(TypeCheck::HaveKind(TypeKind::Struct))
    }

    fn be_enums(self) -> Self {
        self.check(TypeCheck::HaveKind(TypeKind::Enum))
    }

    fn be_abstract(self) -> Self {
        self.check(TypeCheck::AreAbstract)
    }

    fn be_sealed(self) -> Self {
        self.check(TypeCheck::AreSealed)
    }

    fn be_public(self) -> Self {
        self.check(TypeCheck::ArePublic)
    }

    fn be_static(self) -> Self {
        self.check(TypeCheck::AreStatic)
    }

    fn be_nested(self) -> Self {
        self.check(TypeCheck::AreNested)
    }

    fn be_generic(self) -> Self {
        self.check(TypeCheck::AreGeneric)
    }

    fn be_immutable(self) -> Self {
        self.check(TypeCheck::AreImmutable)
    }

    fn have_dependency_on(self, target: impl Into<DependencyTarget>) -> Self {
        self.check(TypeCheck::HaveDependency(DependencyCheck::any([target.into()])))
    }

    fn have_dependency_on_any<I, T>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        self.check(TypeCheck::HaveDependency(DependencyCheck::any(targets)))
    }

    fn have_dependency_on_all<I, T>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        self.check(TypeCheck::HaveDependency(DependencyCheck::all(targets)))
    }

    fn only_have_dependency_on<I, T>(self, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<DependencyTarget>,
    {
        self.check(TypeCheck::HaveDependency(DependencyCheck::only(targets)))
    }

    fn have_dependency(self, check: DependencyCheck) -> Self {
        self.check(TypeCheck::HaveDependency(check))
    }

    fn meet_custom_rule<F>(self, description: impl Into<String>, test: F) -> Self
    where
        F: Fn(&TypeDescriptor) -> bool + Send + Sync + 'static,
    {
        self.check(TypeCheck::MeetCustomRule(CustomRule::new(description, test)))
    }
}

/// Predicate chain: selects the types a rule applies to.
#[derive(Clone, Debug)]
pub struct Predicates {
    catalog: TypeCatalog,
    expression: Expression,
    pending: Pending,
}

impl Predicates {
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The types the predicates select, in catalog order.
    pub fn get_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.expression
            .filter(self.catalog.as_slice(), &self.catalog)
    }

    pub fn should(self) -> Conditions {
        self.into_conditions(Polarity::Should)
    }

    pub fn should_not(self) -> Conditions {
        self.into_conditions(Polarity::ShouldNot)
    }

    fn into_conditions(self, polarity: Polarity) -> Conditions {
        Conditions {
            catalog: self.catalog,
            predicates: self.expression,
            conditions: Expression::new(),
            polarity,
            allow: None,
            pending: Pending::default(),
        }
    }
}

impl CheckChain for Predicates {
    fn check(mut self, check: TypeCheck) -> Self {
        let pending = std::mem::take(&mut self.pending);
        self.expression
            .push(pending.conjunction, check, pending.negate);
        self
    }

    fn join(mut self, conjunction: Conjunction) -> Self {
        self.pending.conjunction = conjunction;
        self
    }

    fn not(mut self) -> Self {
        self.pending.negate = !self.pending.negate;
        self
    }
}

/// Condition chain: what the selected types should (or should not) satisfy.
#[derive(Clone, Debug)]
pub struct Conditions {
    catalog: TypeCatalog,
    predicates: Expression,
    conditions: Expression,
    polarity: Polarity,
    allow: Option<AllowList>,
    pending: Pending,
}

impl Conditions {
    /// The rule this chain describes, detached from the catalog.
    pub fn rule(&self) -> Rule {
        let rule = Rule::new(
            self.predicates.clone(),
            self.conditions.clone(),
            self.polarity,
        );
        match &self.allow {
            Some(allow) => rule.with_allow(allow.clone()),
            None => rule,
        }
    }

    pub fn into_rule(self) -> Rule {
        let rule = Rule::new(self.predicates, self.conditions, self.polarity);
        match self.allow {
            Some(allow) => rule.with_allow(allow),
            None => rule,
        }
    }

    /// Exempt types whose full name matches `allow`.
    pub fn allowing(mut self, allow: AllowList) -> Self {
        self.allow = Some(allow);
        self
    }

    /// Rebind an existing rule to a catalog, for rules that were not built fluently.
    pub fn from_rule(types: Types, rule: &Rule) -> Self {
        Self {
            catalog: types.catalog,
            predicates: rule.predicates().clone(),
            conditions: rule.conditions().clone(),
            polarity: rule.polarity(),
            allow: rule.allow().cloned(),
            pending: Pending::default(),
        }
    }

    /// Filter, then test.
    pub fn get_result(&self) -> TestResult {
        self.rule().evaluate(&self.catalog)
    }

    /// Types the predicates selected, without applying the conditions.
    pub fn get_types(&self) -> Vec<Arc<TypeDescriptor>> {
        self.rule().select(&self.catalog)
    }
}

impl CheckChain for Conditions {
    fn check(mut self, check: TypeCheck) -> Self {
        let pending = std::mem::take(&mut self.pending);
        self.conditions
            .push(pending.conjunction, check, pending.negate);
        self
    }

    fn join(mut self, conjunction: Conjunction) -> Self {
        self.pending.conjunction = conjunction;
        self
    }

    fn not(mut self) -> Self {
        self.pending.negate = !self.pending.negate;
        self
    }
}

use crate::expr::Expression;
use crate::pattern::AllowList;
use crate::snapshot::TypeCatalog;
use archguard_types::TypeDescriptor;
use std::sync::Arc;

/// Whether selected types must satisfy the conditions or must not.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    #[default]
    Should,
    ShouldNot,
}

/// Outcome of one rule. Failing types keep catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    is_successful: bool,
    selected: usize,
    failing_types: Vec<Arc<TypeDescriptor>>,
}

impl TestResult {
    pub fn new(selected: usize, failing_types: Vec<Arc<TypeDescriptor>>) -> Self {
        Self {
            is_successful: failing_types.is_empty(),
            selected,
            failing_types,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    /// Number of types the predicates selected.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn failing_types(&self) -> &[Arc<TypeDescriptor>] {
        &self.failing_types
    }

    pub fn failing_type_names(&self) -> Vec<&str> {
        self.failing_types
            .iter()
            .map(|t| t.full_name.as_str())
            .collect()
    }
}

/// A bound (filter, assertion) pair.
#[derive(Clone, Debug, Default)]
pub struct Rule {
    predicates: Expression,
    conditions: Expression,
    polarity: Polarity,
    name: Option<String>,
    description: Option<String>,
    allow: Option<AllowList>,
}

impl Rule {
    pub fn new(predicates: Expression, conditions: Expression, polarity: Polarity) -> Self {
        Self {
            predicates,
            conditions,
            polarity,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>, description: Option<String>) -> Self {
        self.name = Some(name.into());
        self.description = description;
        self
    }

    /// Exempt types whose full name matches `allow` from selection.
    pub fn with_allow(mut self, allow: AllowList) -> Self {
        self.allow = Some(allow);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn allow(&self) -> Option<&AllowList> {
        self.allow.as_ref()
    }

    pub fn predicates(&self) -> &Expression {
        &self.predicates
    }

    pub fn conditions(&self) -> &Expression {
        &self.conditions
    }

    /// Types the rule applies to: the predicate filter minus allowlisted types.
    pub fn select(&self, catalog: &TypeCatalog) -> Vec<Arc<TypeDescriptor>> {
        let mut selected = self.predicates.filter(catalog.as_slice(), catalog);
        if let Some(allow) = &self.allow {
            selected.retain(|t| !allow.is_allowed(&t.full_name));
        }
        selected
    }

    /// Evaluate against `catalog`. A rule that selects nothing passes.
    pub fn evaluate(&self, catalog: &TypeCatalog) -> TestResult {
        let selected = self.select(catalog);
        let failing: Vec<Arc<TypeDescriptor>> = selected
            .iter()
            .filter(|ty| {
                let holds = self.conditions.evaluate(ty, catalog);
                match self.polarity {
                    Polarity::Should => !holds,
                    Polarity::ShouldNot => holds,
                }
            })
            .cloned()
            .collect();

        tracing::trace!(
            rule = self.name.as_deref().unwrap_or("<unnamed>"),
            selected = selected.len(),
            failing = failing.len(),
            "rule evaluated"
        );

        TestResult::new(selected.len(), failing)
    }

    /// Sentence form, e.g. "types that reside in namespace 'App.Web' should not be sealed".
    pub fn describe(&self) -> String {
        let subject = if self.predicates.is_empty() {
            "types".to_string()
        } else {
            format!("types that {}", self.predicates.describe())
        };
        let verb = match self.polarity {
            Polarity::Should => "should",
            Polarity::ShouldNot => "should not",
        };
        if self.conditions.is_empty() {
            format!("{subject} {verb} exist")
        } else {
            format!("{subject} {verb} {}", self.conditions.describe())
        }
    }
}

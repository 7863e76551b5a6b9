//! Left-to-right boolean expressions over type checks.
//!
//! An expression is a flat list of `(conjunction, check, negate)` terms. There is no grouping
//! and no precedence: `a AND b OR c` is `(a AND b) OR c`. Negation applies to one check only.

use crate::checks::TypeCheck;
use crate::snapshot::TypeCatalog;
use archguard_types::TypeDescriptor;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Conjunction {
    /// Only valid on the first term.
    #[default]
    None,
    And,
    Or,
}

#[derive(Clone, Debug)]
pub struct Term {
    pub conjunction: Conjunction,
    pub check: TypeCheck,
    pub negate: bool,
}

impl Term {
    fn value(&self, ty: &TypeDescriptor, catalog: &TypeCatalog) -> bool {
        self.check.matches(ty, catalog) != self.negate
    }
}

#[derive(Clone, Debug, Default)]
pub struct Expression {
    terms: Vec<Term>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term. The first term's conjunction is forced to `None`; a later term given
    /// `None` joins with AND.
    pub fn push(&mut self, conjunction: Conjunction, check: TypeCheck, negate: bool) {
        let conjunction = match (self.terms.is_empty(), conjunction) {
            (true, _) => Conjunction::None,
            (false, Conjunction::None) => Conjunction::And,
            (false, c) => c,
        };
        self.terms.push(Term {
            conjunction,
            check,
            negate,
        });
    }

    pub fn with(mut self, conjunction: Conjunction, check: TypeCheck, negate: bool) -> Self {
        self.push(conjunction, check, negate);
        self
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate against one type. An empty expression is true.
    ///
    /// Every term is evaluated; the running value is combined in declaration order.
    pub fn evaluate(&self, ty: &TypeDescriptor, catalog: &TypeCatalog) -> bool {
        let Some((first, rest)) = self.terms.split_first() else {
            return true;
        };
        let mut acc = first.value(ty, catalog);
        for term in rest {
            let v = term.value(ty, catalog);
            acc = match term.conjunction {
                Conjunction::Or => acc || v,
                Conjunction::And | Conjunction::None => acc && v,
            };
        }
        acc
    }

    /// The ordered subsequence of `types` for which the expression holds.
    pub fn filter(
        &self,
        types: &[Arc<TypeDescriptor>],
        catalog: &TypeCatalog,
    ) -> Vec<Arc<TypeDescriptor>> {
        if self.is_empty() {
            return types.to_vec();
        }
        types
            .iter()
            .filter(|ty| self.evaluate(ty, catalog))
            .cloned()
            .collect()
    }

    pub fn describe(&self) -> String {
        let mut out = String::new();
        for term in &self.terms {
            match term.conjunction {
                Conjunction::None => {}
                Conjunction::And => out.push_str(" and "),
                Conjunction::Or => out.push_str(" or "),
            }
            if term.negate {
                out.push_str("not ");
            }
            out.push_str(&term.check.describe());
        }
        out
    }
}

//! Pure architecture rule evaluation (no IO).
//!
//! Input: a catalog of type descriptors constructed elsewhere, plus rules built with the
//! fluent [`Types`] builder or bundled into a [`Policy`].
//! Output: per-rule results, per-policy aggregates, and a findings report.
//!
//! ```
//! use archguard_domain::prelude::*;
//! use archguard_types::TypeDescriptor;
//!
//! let mut view = TypeDescriptor::new("App.Presentation.View");
//! view.methods.push(archguard_types::MethodDescriptor {
//!     name: "Render".to_string(),
//!     locals: vec!["App.Data.Repo".into()],
//!     ..Default::default()
//! });
//!
//! let result = Types::from_types(vec![TypeDescriptor::new("App.Data.Repo"), view])
//!     .that()
//!     .reside_in_namespace("App.Presentation")
//!     .should_not()
//!     .have_dependency_on("App.Data")
//!     .get_result();
//!
//! assert!(!result.is_successful());
//! assert_eq!(result.failing_type_names(), vec!["App.Presentation.View"]);
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod checks;
pub mod config;
pub mod dependency;
pub mod error;
pub mod expr;
pub mod pattern;
pub mod policy;
pub mod report;
pub mod rule;
pub mod snapshot;

mod engine;
mod fingerprint;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use builder::{CheckChain, Conditions, Predicates, Types};
pub use checks::{CustomRule, TypeCheck};
pub use dependency::{DependencyCheck, DependencyTarget, MatchMode};
pub use engine::evaluate_policies;
pub use error::{PatternError, PolicyError};
pub use expr::{Conjunction, Expression, Term};
pub use pattern::{AllowList, Pattern};
pub use policy::{BoxError, Policy, PolicyResult, PolicyResults};
pub use rule::{Polarity, Rule, TestResult};
pub use snapshot::TypeCatalog;

/// Everything needed to write rules with the fluent builder.
pub mod prelude {
    pub use crate::builder::{CheckChain, Conditions, Predicates, Types};
    pub use crate::dependency::{DependencyCheck, DependencyTarget, MatchMode};
    pub use crate::pattern::Pattern;
    pub use crate::policy::Policy;
    pub use crate::rule::{Polarity, TestResult};
    pub use crate::snapshot::TypeCatalog;
}

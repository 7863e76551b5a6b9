//! Named collections of rules evaluated together against one type snapshot.
//!
//! A policy is open while rules are added and sealed by its first evaluation. The type source
//! is a deferred provider so that everything it depends on can be set up before the catalog is
//! materialized. It runs at most once per policy.

use crate::builder::{Conditions, Types};
use crate::error::PolicyError;
use crate::rule::TestResult;
use crate::snapshot::TypeCatalog;
use rayon::prelude::*;
use std::fmt;
use std::sync::{Arc, Mutex};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type TypeSource = Box<dyn FnOnce() -> Result<TypeCatalog, BoxError> + Send>;
type RuleBuilder = Box<dyn Fn(Types) -> Conditions + Send + Sync>;

struct PolicyRule {
    name: String,
    description: Option<String>,
    build: RuleBuilder,
}

enum PolicyState {
    Open { source: Option<TypeSource> },
    Sealed(Arc<PolicyResults>),
    Failed(String),
}

pub struct Policy {
    name: String,
    description: Option<String>,
    rules: Vec<PolicyRule>,
    state: Mutex<PolicyState>,
}

/// One rule's outcome within a policy.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyResult {
    pub name: String,
    pub description: Option<String>,
    pub result: TestResult,
}

/// Aggregate of every rule in a policy, in the order the rules were added.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyResults {
    name: String,
    description: Option<String>,
    results: Vec<PolicyResult>,
    types_scanned: usize,
}

impl PolicyResults {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn results(&self) -> &[PolicyResult] {
        &self.results
    }

    /// Size of the snapshot the rules ran against.
    pub fn types_scanned(&self) -> usize {
        self.types_scanned
    }

    pub fn has_violations(&self) -> bool {
        self.results.iter().any(|r| !r.result.is_successful())
    }
}

impl Policy {
    pub fn define(name: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            name: name.into(),
            description: (!description.is_empty()).then_some(description),
            rules: Vec::new(),
            state: Mutex::new(PolicyState::Open { source: None }),
        }
    }

    /// Bind the type source. It is not called until [`Policy::evaluate`].
    ///
    /// A sealed policy rejects the call and keeps its results.
    pub fn for_types<F, E>(&mut self, source: F) -> Result<&mut Self, PolicyError>
    where
        F: FnOnce() -> Result<TypeCatalog, E> + Send + 'static,
        E: Into<BoxError>,
    {
        let policy = self.name.clone();
        match self.state_mut()? {
            PolicyState::Open { source: slot } => {
                *slot = Some(Box::new(move || source().map_err(Into::into)));
            }
            PolicyState::Sealed(_) | PolicyState::Failed(_) => {
                return Err(PolicyError::Sealed { policy });
            }
        }
        Ok(self)
    }

    /// Bind an already materialized catalog.
    pub fn for_catalog(&mut self, catalog: TypeCatalog) -> Result<&mut Self, PolicyError> {
        self.for_types(move || Ok::<_, BoxError>(catalog))
    }

    /// Append a rule. Fails once the policy has been evaluated; the sealed results stay
    /// available through [`Policy::evaluate`].
    pub fn add<F>(
        &mut self,
        build: F,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<&mut Self, PolicyError>
    where
        F: Fn(Types) -> Conditions + Send + Sync + 'static,
    {
        let policy = self.name.clone();
        if !matches!(self.state_mut()?, PolicyState::Open { .. }) {
            return Err(PolicyError::Sealed { policy });
        }
        let description = description.into();
        self.rules.push(PolicyRule {
            name: name.into(),
            description: (!description.is_empty()).then_some(description),
            build: Box::new(build),
        });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.state
            .lock()
            .map(|s| !matches!(*s, PolicyState::Open { .. }))
            .unwrap_or(true)
    }

    /// Seal the policy, materialize the type source, and run every rule against it.
    ///
    /// Later calls return the same results without touching the source again. Concurrent
    /// callers serialize on the policy's lock.
    pub fn evaluate(&self) -> Result<Arc<PolicyResults>, PolicyError> {
        let mut state = self.state.lock().map_err(|_| PolicyError::Poisoned {
            policy: self.name.clone(),
        })?;

        let source = match &mut *state {
            PolicyState::Sealed(results) => return Ok(Arc::clone(results)),
            PolicyState::Failed(message) => {
                return Err(PolicyError::TypeSource {
                    policy: self.name.clone(),
                    message: message.clone(),
                });
            }
            PolicyState::Open { source } => source.take(),
        };
        let Some(source) = source else {
            return Err(PolicyError::MissingTypeSource {
                policy: self.name.clone(),
            });
        };

        let span = tracing::info_span!("policy", name = %self.name, rules = self.rules.len());
        let _guard = span.enter();

        let catalog = match source() {
            Ok(catalog) => catalog,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "type source failed; policy sealed as failed");
                *state = PolicyState::Failed(message.clone());
                return Err(PolicyError::TypeSource {
                    policy: self.name.clone(),
                    message,
                });
            }
        };
        tracing::debug!(types = catalog.len(), "type source materialized");

        let results = Arc::new(self.run(&catalog));
        tracing::debug!(
            has_violations = results.has_violations(),
            "policy sealed"
        );
        *state = PolicyState::Sealed(Arc::clone(&results));
        Ok(results)
    }

    fn run(&self, catalog: &TypeCatalog) -> PolicyResults {
        let results: Vec<PolicyResult> = self
            .rules
            .par_iter()
            .map(|rule| {
                let conditions = (rule.build)(Types::from_catalog(catalog.clone()));
                let result = conditions.get_result();
                tracing::debug!(
                    rule = %rule.name,
                    passed = result.is_successful(),
                    failing = result.failing_types().len(),
                    "rule evaluated"
                );
                PolicyResult {
                    name: rule.name.clone(),
                    description: rule.description.clone(),
                    result,
                }
            })
            .collect();

        PolicyResults {
            name: self.name.clone(),
            description: self.description.clone(),
            results,
            types_scanned: catalog.len(),
        }
    }

    fn state_mut(&mut self) -> Result<&mut PolicyState, PolicyError> {
        let policy = self.name.clone();
        self.state
            .get_mut()
            .map_err(|_| PolicyError::Poisoned { policy })
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("description", &self.description)
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            )
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

use thiserror::Error;

/// Errors raised by the policy surface.
///
/// Rule violations are never errors: they are reported through [`crate::TestResult`] and
/// [`crate::PolicyResults`].
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy '{policy}' is sealed: rules cannot be changed after evaluation")]
    Sealed { policy: String },

    #[error("policy '{policy}' has no type source; bind one with for_types before evaluating")]
    MissingTypeSource { policy: String },

    #[error("type source for policy '{policy}' failed: {message}")]
    TypeSource { policy: String, message: String },

    #[error("policy '{policy}' state lock was poisoned by a panicking evaluation")]
    Poisoned { policy: String },
}

impl PolicyError {
    /// Misuse of the policy API (as opposed to a failing type source).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PolicyError::Sealed { .. } | PolicyError::MissingTypeSource { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regex '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

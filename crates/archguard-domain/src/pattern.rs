use crate::error::PatternError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use std::fmt;

/// Pre-compiled regular expression used by the `*_matching` checks.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Regex::new(pattern)
            .map(Pattern)
            .map_err(|source| PatternError::Regex {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(value: Regex) -> Self {
        Pattern(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Glob patterns over type full names that exempt matching types from a rule.
#[derive(Clone)]
pub struct AllowList {
    patterns: Vec<String>,
    set: GlobSet,
}

impl AllowList {
    pub fn new(patterns: &[String]) -> Result<Self, PatternError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|source| PatternError::Glob {
                pattern: pattern.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| PatternError::Glob {
            pattern: patterns.join(", "),
            source,
        })?;
        Ok(Self {
            patterns: patterns.to_vec(),
            set,
        })
    }

    pub fn is_allowed(&self, full_name: &str) -> bool {
        self.set.is_match(full_name)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl fmt::Debug for AllowList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AllowList").field(&self.patterns).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_regex_is_reported_with_pattern() {
        let err = Pattern::new("(unclosed").expect_err("should fail");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn allowlist_matches_full_names() {
        let allow = AllowList::new(&["App.Legacy.*".to_string(), "*Shim".to_string()])
            .expect("valid globs");
        assert!(allow.is_allowed("App.Legacy.OldRepo"));
        assert!(allow.is_allowed("App.Web.CookieShim"));
        assert!(!allow.is_allowed("App.Web.Controller"));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let err = AllowList::new(&["App.[".to_string()]).expect_err("should fail");
        assert!(err.to_string().contains("App.["));
    }
}

//! Key Pattern Module
//!
//! Predicates over cache keys used for bulk invalidation.

use std::fmt;

use regex::Regex;

use crate::error::{CacheError, Result};

// == Key Pattern ==
/// Matches cache keys for `invalidate_pattern`.
#[derive(Clone)]
pub enum KeyPattern {
    /// The key itself or anything nested under it (`ns` or `ns:...`)
    Namespace(String),
    /// Plain string prefix
    Prefix(String),
    /// Substring anywhere in the key
    Contains(String),
    /// Full regular expression test
    Regex(Regex),
}

impl KeyPattern {
    pub fn namespace(ns: impl Into<String>) -> Self {
        Self::Namespace(ns.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    /// Compiles a regular expression pattern.
    pub fn regex(expr: &str) -> Result<Self> {
        Regex::new(expr)
            .map(Self::Regex)
            .map_err(|e| CacheError::InvalidPattern(e.to_string()))
    }

    // == Matches ==
    /// Returns true if `key` satisfies the pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Namespace(ns) => key
                .strip_prefix(ns.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':')),
            KeyPattern::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyPattern::Contains(needle) => key.contains(needle.as_str()),
            KeyPattern::Regex(re) => re.is_match(key),
        }
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Namespace(ns) => write!(f, "namespace({ns})"),
            KeyPattern::Prefix(prefix) => write!(f, "prefix({prefix})"),
            KeyPattern::Contains(needle) => write!(f, "contains({needle})"),
            KeyPattern::Regex(re) => write!(f, "regex({})", re.as_str()),
        }
    }
}

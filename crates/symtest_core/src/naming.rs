//! Turn test locations into canonical, separator-free identifiers.
//!
//! A canonical name is the location with its source suffix removed and every path separator replaced with `_`:
//!
//! ```rust
//! use symtest_core::NamingRules;
//!
//! let rules = NamingRules::default();
//! let name = rules.normalize("tests/test_succeeds_1.f90").unwrap();
//! assert_eq!(name.as_str(), "tests_test_succeeds_1");
//! ```
//!
//! ## Notes
//!
//! - A location without a recognized suffix is an error, never a silent pass-through.
//! - The result must be usable as a routine name in the compiled language: ASCII letters, digits and `_`, not starting
//!   with a digit.
//! - Two locations may still normalize to the same name (`tests/a/b.f90` and `tests/a_b.f90`); detecting that is the
//!   job of whoever assembles the full test set.

use std::fmt;

use crate::errors::NamingError;

/// Default recognized source suffix.
pub const DEFAULT_SUFFIX: &str = ".f90";

/// Default path separators (POSIX and Windows).
pub const DEFAULT_SEPARATORS: &[char] = &['/', '\\'];

/// Replacement for every path separator.
pub const SEPARATOR_REPLACEMENT: char = '_';

/// A flattened test identifier, e.g. `tests_test_io`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Suffix and separator conventions used by [`NamingRules::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingRules {
    /// Recognized source-file suffixes, tried in order. Matching is case-sensitive.
    pub suffixes: Vec<String>,
    /// Characters treated as path separators.
    pub separators: Vec<char>,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            suffixes: vec![DEFAULT_SUFFIX.to_string()],
            separators: DEFAULT_SEPARATORS.to_vec(),
        }
    }
}

impl NamingRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the recognized suffixes.
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the path separators.
    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    /// Derive the canonical name of a test location.
    ///
    /// ## Parameters
    /// - `location`: the test's location string, e.g. `tests/test_io.f90`.
    ///
    /// ## Returns
    /// - (`CanonicalName`): the location without its suffix, separators replaced by `_`.
    ///
    /// ## Errors
    /// - [`NamingError::MissingSuffix`] when no recognized suffix ends the location.
    /// - [`NamingError::Empty`] when nothing is left after removing the suffix.
    /// - [`NamingError::InvalidIdentifier`] when the result is not a valid routine name.
    pub fn normalize(&self, location: &str) -> Result<CanonicalName, NamingError> {
        let stem = self.strip_suffix(location).ok_or_else(|| NamingError::MissingSuffix {
            location: location.to_string(),
            expected: self.suffixes.join(", "),
        })?;

        if stem.is_empty() {
            return Err(NamingError::Empty {
                location: location.to_string(),
            });
        }

        let name = self.flatten(stem);
        if let Some(reason) = identifier_problem(&name) {
            return Err(NamingError::InvalidIdentifier {
                location: location.to_string(),
                name,
                reason,
            });
        }

        Ok(CanonicalName(name))
    }

    /// Replace every separator in `text` with `_`.
    ///
    /// ## Notes
    /// - Idempotent: the output contains no separators, so flattening it again is a no-op.
    pub fn flatten(&self, text: &str) -> String {
        text.chars()
            .map(|c| if self.separators.contains(&c) { SEPARATOR_REPLACEMENT } else { c })
            .collect()
    }

    fn strip_suffix<'a>(&self, location: &'a str) -> Option<&'a str> {
        self.suffixes
            .iter()
            .filter(|suffix| !suffix.is_empty())
            .find_map(|suffix| location.strip_suffix(suffix.as_str()))
    }
}

/// Check a flattened name against the identifier alphabet.
fn identifier_problem(name: &str) -> Option<String> {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Some("identifiers cannot start with a digit".to_string());
    }
    name.chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|c| format!("character {c:?} is not allowed"))
}

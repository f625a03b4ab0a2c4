//! Symbol-mangling conventions for compiled test routines.
//!
//! ## Examples
//! ```rust
//! use symtest_core::{NamingRules, Platform};
//!
//! let name = NamingRules::default().normalize("tests/test_fails_1.f90").unwrap();
//! assert_eq!(Platform::LowercaseTrailingUnderscore.mangle(&name).as_str(), "tests_test_fails_1_");
//! assert_eq!(Platform::UppercaseNoSuffix.mangle(&name).as_str(), "TESTS_TEST_FAILS_1");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::naming::CanonicalName;

/// The exact, linker-visible name of a compiled test routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MangledSymbol(String);

impl MangledSymbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MangledSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for MangledSymbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// How a compiler turns a routine name into an exported symbol.
///
/// New compilers with other conventions get a new variant (and rows in [`crate::toolchain::TOOLCHAINS`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `tests_io` → `TESTS_IO` (e.g. Intel Fortran on Windows).
    UppercaseNoSuffix,
    /// `tests_io` → `tests_io_` (e.g. gfortran).
    LowercaseTrailingUnderscore,
}

impl Platform {
    /// Every supported convention.
    pub const ALL: &'static [Platform] = &[Platform::UppercaseNoSuffix, Platform::LowercaseTrailingUnderscore];

    /// Mangle a canonical name into the symbol the linker will see.
    ///
    /// ## Notes
    /// - Case conversion is ASCII-only; canonical names are ASCII by construction.
    pub fn mangle(self, name: &CanonicalName) -> MangledSymbol {
        let name = name.as_str();
        let symbol = match self {
            Platform::UppercaseNoSuffix => name.to_ascii_uppercase(),
            Platform::LowercaseTrailingUnderscore => {
                let mut symbol = name.to_ascii_lowercase();
                symbol.push('_');
                symbol
            }
        };
        MangledSymbol(symbol)
    }

    /// Canonical spelling used in configuration files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::UppercaseNoSuffix => "uppercase-no-suffix",
            Platform::LowercaseTrailingUnderscore => "lowercase-trailing-underscore",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a platform spelling is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}' (expected one of: uppercase-no-suffix, lowercase-trailing-underscore)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

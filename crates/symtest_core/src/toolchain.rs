//! Toolchain vocabulary: which compiler/OS combination uses which [`Platform`].
//!
//! The build system knows the compiler identity (CMake's `CMAKE_Fortran_COMPILER_ID` spelling is used here) and the
//! target OS; this table turns that into a mangling convention.
//!
//! ## Notes
//! - Lookup via [`resolve`] is case-insensitive on both compiler id and OS.
//! - Rows are scanned in order and the first match wins, so OS-specific rows must precede the generic row for the same
//!   compiler.
//!
//! ## Examples
//! ```rust
//! use symtest_core::toolchain;
//! use symtest_core::Platform;
//!
//! assert_eq!(toolchain::resolve("GNU", "linux"), Some(Platform::LowercaseTrailingUnderscore));
//! assert_eq!(toolchain::resolve("Intel", "windows"), Some(Platform::UppercaseNoSuffix));
//! assert_eq!(toolchain::resolve("Intel", "linux"), Some(Platform::LowercaseTrailingUnderscore));
//! ```

use crate::platform::Platform;

/// One row of the toolchain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainInfo {
    /// Compiler identifier, e.g. `GNU`.
    pub compiler: &'static str,
    /// Target OS (`std::env::consts::OS` spelling), or `None` for any OS.
    pub os: Option<&'static str>,
    pub platform: Platform,
    /// Human-readable note shown by `symtest platforms`.
    pub note: &'static str,
}

const fn row(compiler: &'static str, os: Option<&'static str>, platform: Platform, note: &'static str) -> ToolchainInfo {
    ToolchainInfo {
        compiler,
        os,
        platform,
        note,
    }
}

/// Known compilers and their default external-name conventions.
pub const TOOLCHAINS: &[ToolchainInfo] = &[
    row("Intel", Some("windows"), Platform::UppercaseNoSuffix, "ifort on Windows"),
    row("IntelLLVM", Some("windows"), Platform::UppercaseNoSuffix, "ifx on Windows"),
    row("Intel", None, Platform::LowercaseTrailingUnderscore, "ifort"),
    row("IntelLLVM", None, Platform::LowercaseTrailingUnderscore, "ifx"),
    row("GNU", None, Platform::LowercaseTrailingUnderscore, "gfortran"),
    row("Flang", None, Platform::LowercaseTrailingUnderscore, "classic flang"),
    row("LLVMFlang", None, Platform::LowercaseTrailingUnderscore, "flang-new"),
    row("NVHPC", None, Platform::LowercaseTrailingUnderscore, "nvfortran"),
    row("PGI", None, Platform::LowercaseTrailingUnderscore, "pgfortran"),
    row("Cray", None, Platform::LowercaseTrailingUnderscore, "Cray ftn"),
    row("NAG", None, Platform::LowercaseTrailingUnderscore, "nagfor"),
];

/// Resolve a compiler id and target OS to a mangling convention.
///
/// ## Returns
/// - `Some(Platform)` for the first matching row, `None` for an unknown compiler.
pub fn resolve(compiler: &str, os: &str) -> Option<Platform> {
    TOOLCHAINS
        .iter()
        .filter(|info| info.compiler.eq_ignore_ascii_case(compiler))
        .find(|info| info.os.is_none_or(|row_os| row_os.eq_ignore_ascii_case(os)))
        .map(|info| info.platform)
}

/// Compiler ids present in the table, in table order and without duplicates.
pub fn known_compilers() -> Vec<&'static str> {
    let mut compilers: Vec<&'static str> = Vec::new();
    for info in TOOLCHAINS {
        if !compilers.contains(&info.compiler) {
            compilers.push(info.compiler);
        }
    }
    compilers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gnu_is_lowercase_everywhere() {
        for os in ["linux", "macos", "windows"] {
            assert_eq!(resolve("GNU", os), Some(Platform::LowercaseTrailingUnderscore));
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(resolve("intel", "WINDOWS"), Some(Platform::UppercaseNoSuffix));
        assert_eq!(resolve("gnu", "linux"), Some(Platform::LowercaseTrailingUnderscore));
    }

    #[test]
    fn test_unknown_compiler() {
        assert_eq!(resolve("Absoft", "linux"), None);
    }

    #[test]
    fn test_os_specific_rows_precede_generic_rows() {
        for (i, info) in TOOLCHAINS.iter().enumerate() {
            if info.os.is_some() {
                let generic_before = TOOLCHAINS[..i]
                    .iter()
                    .any(|earlier| earlier.compiler == info.compiler && earlier.os.is_none());
                assert!(!generic_before, "generic row for {} shadows its {:?} row", info.compiler, info.os);
            }
        }
    }

    #[test]
    fn test_known_compilers_unique() {
        let compilers = known_compilers();
        assert!(compilers.contains(&"GNU"));
        assert_eq!(compilers.iter().filter(|c| **c == "Intel").count(), 1);
    }
}

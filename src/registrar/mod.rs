//! Test registration
//!
//! Turns a [`TestSet`] into one [`TestCase`] per test and hands them to a test-execution engine through the
//! [`TestRegistry`] trait. A case is named after its original location and invokes the dispatcher with the test's
//! mangled symbol as the only argument; the engine decides pass/fail from the exit status.
//!
//! Registries only render their output; writing it is left to the caller, which stages it together with the
//! dispatcher source (see [`crate::staging`]).
//!
//! ## Registries
//!
//! - [`ManifestFile`] - JSON manifest, consumed by `symtest run`
//! - [`CTestScript`] - `add_test()` lines for CTest
//! - `Vec<TestCase>` - in memory

mod ctest;
mod manifest;

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::testset::TestSet;

pub use ctest::CTestScript;
pub use manifest::{MANIFEST_VERSION, Manifest, ManifestFile};

/// Errors raised while handing cases to a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize manifest {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed manifest {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} has version {found}, expected {expected}", path.display())]
    Version { path: PathBuf, found: u32, expected: u32 },
}

/// How a test case is executed: the dispatcher plus exactly one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: PathBuf,
    pub argument: String,
}

impl Invocation {
    /// Build the process command for this invocation.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(&self.argument);
        command
    }
}

/// One registered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Display name: the original test location.
    pub name: String,
    pub invocation: Invocation,
}

/// Registration file rendered by a registry, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryOutput {
    pub path: PathBuf,
    pub contents: String,
}

/// Registration interface of a test-execution engine.
pub trait TestRegistry {
    fn add(&mut self, case: &TestCase) -> Result<(), RegistryError>;

    /// Render the file this registry persists to, once every case was added.
    ///
    /// In-memory registries have nothing to write and return `None`.
    fn render(&self) -> Result<Option<RegistryOutput>, RegistryError> {
        Ok(None)
    }
}

impl TestRegistry for Vec<TestCase> {
    fn add(&mut self, case: &TestCase) -> Result<(), RegistryError> {
        self.push(case.clone());
        Ok(())
    }
}

/// Create one test case per pair, in set order.
///
/// Taking the same [`TestSet`] the dispatcher was generated from is what guarantees every registered symbol is compiled
/// into the dispatcher.
pub fn register(tests: &TestSet, dispatcher: impl AsRef<Path>) -> Vec<TestCase> {
    let dispatcher = dispatcher.as_ref();
    tests
        .iter()
        .map(|pair| TestCase {
            name: pair.location.clone(),
            invocation: Invocation {
                program: dispatcher.to_path_buf(),
                argument: pair.symbol.to_string(),
            },
        })
        .collect()
}

/// Hand every case to `registry` and render its output.
pub fn publish(cases: &[TestCase], registry: &mut dyn TestRegistry) -> Result<Option<RegistryOutput>, RegistryError> {
    for case in cases {
        registry.add(case)?;
    }
    registry.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use symtest_core::{NamingRules, Platform};

    fn sample(platform: Platform) -> TestSet {
        TestSet::build(
            ["tests/test_succeeds_1.f90", "tests/test_fails_1.f90"],
            &NamingRules::default(),
            platform,
        )
        .unwrap()
    }

    #[test]
    fn test_register_uses_location_and_symbol() {
        let cases = register(&sample(Platform::LowercaseTrailingUnderscore), "build/dispatcher");
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].name, "tests/test_succeeds_1.f90");
        assert_eq!(cases[0].invocation.program, PathBuf::from("build/dispatcher"));
        assert_eq!(cases[0].invocation.argument, "tests_test_succeeds_1_");
        assert_eq!(cases[1].name, "tests/test_fails_1.f90");
        assert_eq!(cases[1].invocation.argument, "tests_test_fails_1_");
    }

    #[test]
    fn test_every_case_targets_a_compiled_symbol() {
        let set = sample(Platform::UppercaseNoSuffix);
        for case in register(&set, "dispatcher") {
            assert!(set.find_symbol(&case.invocation.argument).is_some());
        }
    }

    #[test]
    fn test_publish_into_memory() {
        let cases = register(&sample(Platform::UppercaseNoSuffix), "dispatcher");
        let mut registry: Vec<TestCase> = Vec::new();
        assert_eq!(publish(&cases, &mut registry).unwrap(), None);
        assert_eq!(registry, cases);
    }

    #[test]
    fn test_invocation_command_has_single_argument() {
        let case = &register(&sample(Platform::UppercaseNoSuffix), "bin/dispatcher")[1];
        let command = case.invocation.command();
        assert_eq!(command.get_program(), "bin/dispatcher");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["TESTS_TEST_FAILS_1"]);
    }
}

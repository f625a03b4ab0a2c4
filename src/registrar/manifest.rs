//! JSON registration manifest.
//!
//! ```json
//! {
//!   "version": 1,
//!   "platform": "lowercase-trailing-underscore",
//!   "dispatcher": "build/symtest_dispatcher",
//!   "tests": [
//!     { "name": "tests/test_io.f90", "invocation": { "program": "build/symtest_dispatcher", "argument": "tests_test_io_" } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use symtest_core::Platform;

use super::{RegistryError, RegistryOutput, TestCase, TestRegistry};

pub const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub platform: String,
    pub dispatcher: PathBuf,
    pub tests: Vec<TestCase>,
}

impl Manifest {
    pub fn new(platform: Platform, dispatcher: impl Into<PathBuf>) -> Self {
        Self {
            version: MANIFEST_VERSION,
            platform: platform.to_string(),
            dispatcher: dispatcher.into(),
            tests: Vec::new(),
        }
    }

    /// Read and validate a manifest written by [`ManifestFile`].
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = serde_json::from_str(&text).map_err(|source| RegistryError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(RegistryError::Version {
                path: path.to_path_buf(),
                found: manifest.version,
                expected: MANIFEST_VERSION,
            });
        }
        Ok(manifest)
    }
}

/// Registry that collects cases and renders them as a manifest file.
pub struct ManifestFile {
    path: PathBuf,
    manifest: Manifest,
}

impl ManifestFile {
    pub fn new(path: impl Into<PathBuf>, platform: Platform, dispatcher: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            manifest: Manifest::new(platform, dispatcher),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }
}

impl TestRegistry for ManifestFile {
    fn add(&mut self, case: &TestCase) -> Result<(), RegistryError> {
        self.manifest.tests.push(case.clone());
        Ok(())
    }

    fn render(&self) -> Result<Option<RegistryOutput>, RegistryError> {
        let json = serde_json::to_string_pretty(&self.manifest).map_err(|source| RegistryError::Serialize {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(RegistryOutput {
            path: self.path.clone(),
            contents: json + "\n",
        }))
    }
}

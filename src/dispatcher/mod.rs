//! Dispatcher generation
//!
//! The dispatcher is a single generated program that owns a reference to every compiled test routine. Its runtime
//! contract is the same in every language it can be emitted in:
//!
//! ```text
//! dispatcher <mangled-symbol>
//!   known symbol    → call the routine, exit with its integer result
//!   anything else   → diagnostic on stderr, exit UNKNOWN_SYMBOL_EXIT_CODE, no routine called
//! ```
//!
//! Dispatch is a generated, finite comparison chain over the symbols known at generation time. Every routine is
//! declared by its exact mangled name, so a missing routine is a link error rather than a runtime surprise.
//!
//! ## Modules
//!
//! - `c` - C99 dispatcher (`strcmp` chain)
//! - `rust` - Rust dispatcher (`extern "C"` block + `match`), emitted with quote and prettyplease

mod c;
mod rust;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::GenerateError;
use crate::staging::Staging;
use crate::testset::TestSet;

pub use c::CEmitter;
pub use rust::RustEmitter;

/// Exit status of a dispatcher asked for a symbol it does not know (`EX_USAGE` from sysexits.h).
///
/// A routine may legitimately return the same value; the runner only uses it as a hint.
pub const UNKNOWN_SYMBOL_EXIT_CODE: i32 = 64;

/// Language the dispatcher source is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DispatcherLanguage {
    #[default]
    C,
    Rust,
}

impl DispatcherLanguage {
    pub const ALL: &'static [DispatcherLanguage] = &[DispatcherLanguage::C, DispatcherLanguage::Rust];

    pub fn as_str(self) -> &'static str {
        match self {
            DispatcherLanguage::C => "c",
            DispatcherLanguage::Rust => "rust",
        }
    }

    /// File extension of emitted sources.
    pub fn extension(self) -> &'static str {
        match self {
            DispatcherLanguage::C => "c",
            DispatcherLanguage::Rust => "rs",
        }
    }

    fn emitter(self) -> Box<dyn DispatcherEmitter> {
        match self {
            DispatcherLanguage::C => Box::new(CEmitter),
            DispatcherLanguage::Rust => Box::new(RustEmitter),
        }
    }
}

impl fmt::Display for DispatcherLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DispatcherLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DispatcherLanguage::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str().eq_ignore_ascii_case(s) || lang.extension().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown dispatcher language '{}' (expected 'c' or 'rust')", s))
    }
}

/// Emits dispatcher source for one target language.
///
/// Implementations must be deterministic: the same set always yields byte-identical source.
pub trait DispatcherEmitter {
    fn language(&self) -> DispatcherLanguage;

    fn emit(&self, tests: &TestSet) -> Result<String, GenerateError>;
}

/// Generated dispatcher source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherSource {
    pub language: DispatcherLanguage,
    pub text: String,
}

impl DispatcherSource {
    /// Write the source to `path`, creating parent directories.
    ///
    /// Returns `false` (and leaves the file untouched) when it already holds identical content, so build systems do not
    /// see a fresh timestamp and relink for nothing.
    pub fn write_to(&self, path: &Path) -> Result<bool, GenerateError> {
        let mut staging = Staging::new();
        staging.add(path, self.text.as_str());
        let written = staging.commit()?;
        if written.is_empty() {
            tracing::debug!(path = %path.display(), "dispatcher source unchanged");
        }
        Ok(!written.is_empty())
    }
}

impl fmt::Display for DispatcherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Generate the dispatcher for a complete test set.
#[tracing::instrument(skip_all, fields(language = %language, tests = tests.len()))]
pub fn generate(tests: &TestSet, language: DispatcherLanguage) -> Result<DispatcherSource, GenerateError> {
    if tests.is_empty() {
        tracing::warn!("generating a dispatcher with no tests; every invocation will be rejected");
    }
    let emitter = language.emitter();
    let text = emitter.emit(tests)?;
    Ok(DispatcherSource {
        language: emitter.language(),
        text,
    })
}

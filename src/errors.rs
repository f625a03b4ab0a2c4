//! Generation-time errors.
//!
//! Every variant is fatal to the build step: nothing is written once one of these is raised.

use std::path::PathBuf;

use miette::Diagnostic;
use symtest_core::NamingError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(
        code(symtest::naming),
        help("locations must end with a recognized suffix (`[naming] suffixes`) and flatten to a valid identifier")
    )]
    Naming(#[from] NamingError),

    #[error("test locations '{first}' and '{second}' both map to symbol '{symbol}'")]
    #[diagnostic(
        code(symtest::collision),
        help("rename one of the tests; symbols must stay unique after separators are flattened and case is folded")
    )]
    Collision {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("failed to emit dispatcher source: {0}")]
    #[diagnostic(code(symtest::emit))]
    Emission(String),

    #[error("failed to write {}: {source}", path.display())]
    #[diagnostic(code(symtest::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! CLI module for symtest
//!
//! ## Commands
//!
//! - `names [LOCATION]...` - Show canonical names and symbols
//! - `generate [LOCATION]...` - Write the dispatcher source and test registrations
//! - `run --manifest FILE` - Run registered tests (ctest-style)
//! - `platforms` - List mangling conventions and known compilers
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigError;
use crate::dispatcher::DispatcherLanguage;
use crate::errors::GenerateError;
use crate::registrar::RegistryError;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Render a diagnostic (code, message, help) as a failure.
    fn diagnostic<E>(error: E) -> Self
    where
        E: miette::Diagnostic + Send + Sync + 'static,
    {
        Self::failure(format!("{:?}", miette::Report::new(error)))
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<GenerateError> for CliError {
    fn from(error: GenerateError) -> Self {
        Self::diagnostic(error)
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        Self::diagnostic(error)
    }
}

impl From<RegistryError> for CliError {
    fn from(error: RegistryError) -> Self {
        Self::failure(format!("Error: {}", error))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Register natively compiled test routines as individual test cases
#[derive(Parser, Debug)]
#[command(name = "symtest")]
#[command(version = VERSION)]
#[command(about = "Generate a test dispatcher and per-routine test registrations", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./symtest.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Where test locations come from and how they are named and mangled.
#[derive(Args, Debug, Default, Clone)]
pub struct TestInputArgs {
    /// Test locations, e.g. tests/test_io.f90 (replaces `[tests] locations`)
    #[arg(value_name = "LOCATION")]
    pub locations: Vec<String>,

    /// Read test locations from a file, one per line
    #[arg(long = "list", value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Mangling convention (uppercase-no-suffix, lowercase-trailing-underscore)
    #[arg(long, value_name = "PLATFORM", conflicts_with = "compiler")]
    pub platform: Option<String>,

    /// Compiler id used to look up the mangling convention (e.g. GNU, Intel)
    #[arg(long, value_name = "ID")]
    pub compiler: Option<String>,

    /// Target OS for the compiler lookup (default: host OS)
    #[arg(long, value_name = "OS")]
    pub os: Option<String>,

    /// Recognized source suffix (repeatable; replaces `[naming] suffixes`)
    #[arg(long = "suffix", value_name = "SUFFIX")]
    pub suffixes: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the canonical name and mangled symbol of each test
    Names {
        #[command(flatten)]
        input: TestInputArgs,
    },

    /// Generate the dispatcher source and test registrations
    Generate {
        #[command(flatten)]
        input: TestInputArgs,
        /// Dispatcher language: c or rust
        #[arg(long = "lang", value_name = "LANG")]
        language: Option<DispatcherLanguage>,
        /// Where to write the dispatcher source (default: stdout)
        #[arg(short = 'o', long = "source", value_name = "FILE")]
        source: Option<PathBuf>,
        /// Path of the compiled dispatcher, as invoked by registered tests
        #[arg(long = "dispatcher", value_name = "PATH")]
        dispatcher: Option<PathBuf>,
        /// Write a JSON test manifest
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Write a CTest script with one add_test() per test
        #[arg(long, value_name = "FILE")]
        ctest: Option<PathBuf>,
    },

    /// Run the tests registered in a manifest
    Run {
        /// Manifest written by `symtest generate --manifest`
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
        /// Stop on first failure
        #[arg(short = 'x', long = "exitfirst")]
        stop_on_fail: bool,
    },

    /// List mangling conventions and the compilers that use them
    Platforms,
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Names { input } => commands::show_names(&input, &config),
        Command::Generate {
            input,
            language,
            source,
            dispatcher,
            manifest,
            ctest,
        } => commands::generate(
            &input,
            &config,
            commands::GenerateOutputs {
                language,
                source,
                dispatcher,
                manifest,
                ctest,
            },
        ),
        Command::Run {
            manifest,
            verbose,
            stop_on_fail,
        } => commands::run_manifest(manifest, &config, verbose, stop_on_fail),
        Command::Platforms => commands::list_platforms(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_names() {
        let cli = Cli::try_parse_from(["symtest", "names", "tests/a.f90", "--platform", "uppercase-no-suffix"]).unwrap();
        if let Command::Names { input } = cli.command {
            assert_eq!(input.locations, ["tests/a.f90"]);
            assert_eq!(input.platform.as_deref(), Some("uppercase-no-suffix"));
        } else {
            panic!("Expected Names command");
        }
    }

    #[test]
    fn test_cli_parse_generate() {
        let cli = Cli::try_parse_from([
            "symtest",
            "generate",
            "tests/a.f90",
            "tests/b.f90",
            "--compiler",
            "GNU",
            "--lang",
            "rust",
            "-o",
            "build/dispatcher.rs",
            "--dispatcher",
            "build/dispatcher",
            "--manifest",
            "build/tests.json",
        ])
        .unwrap();
        if let Command::Generate {
            input,
            language,
            source,
            manifest,
            ctest,
            ..
        } = cli.command
        {
            assert_eq!(input.locations.len(), 2);
            assert_eq!(input.compiler.as_deref(), Some("GNU"));
            assert_eq!(language, Some(DispatcherLanguage::Rust));
            assert_eq!(source, Some(PathBuf::from("build/dispatcher.rs")));
            assert_eq!(manifest, Some(PathBuf::from("build/tests.json")));
            assert!(ctest.is_none());
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn test_cli_platform_conflicts_with_compiler() {
        let result = Cli::try_parse_from([
            "symtest",
            "names",
            "--platform",
            "uppercase-no-suffix",
            "--compiler",
            "GNU",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["symtest", "generate", "--lang", "cobol"]).is_err());
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from(["symtest", "run", "--manifest", "t.json", "-v", "-x"]).unwrap();
        if let Command::Run {
            manifest,
            verbose,
            stop_on_fail,
        } = cli.command
        {
            assert_eq!(manifest, Some(PathBuf::from("t.json")));
            assert!(verbose);
            assert!(stop_on_fail);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from(["symtest", "platforms", "--config", "ci/symtest.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci/symtest.toml")));
        assert!(matches!(cli.command, Command::Platforms));
    }
}

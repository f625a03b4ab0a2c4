#![forbid(unsafe_code)]
//! symtest: test identity and dispatch for natively compiled test routines
//!
//! Languages such as Fortran have no lightweight unit-test runner of their own. symtest lets each test routine run as
//! its own test case in a generic runner (CTest, or `symtest run`) by bridging two naming worlds:
//!
//! ```text
//! tests/test_io.f90 ──normalize──▶ tests_test_io ──mangle──▶ tests_test_io_
//!      (location)                   (canonical)              (linker symbol)
//! ```
//!
//! - [`testset`] runs the naming pipeline over the whole batch and rejects collisions.
//! - [`dispatcher`] emits one program that calls the routine named on its command line.
//! - [`registrar`] emits one test case per routine: `<dispatcher> <symbol>`, pass on exit 0.
//! - [`runner`] executes registered cases sequentially and reports ctest-style.
//! - [`staging`] writes all generated files of one run, or none of them.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//! - **Generated code**: the emitted dispatchers contain `unsafe` foreign calls as *output text*; this crate itself
//!   forbids unsafe code.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod registrar;
pub mod runner;
pub mod staging;
pub mod testset;

pub use symtest_core::naming;
pub use symtest_core::platform;
pub use symtest_core::toolchain;
pub use symtest_core::{CanonicalName, MangledSymbol, NamingError, NamingRules, Platform};

pub use dispatcher::{DispatcherLanguage, DispatcherSource, UNKNOWN_SYMBOL_EXIT_CODE};
pub use errors::GenerateError;
pub use registrar::{TestCase, register};
pub use testset::{TestPair, TestSet};

//! Provide the pure naming vocabulary shared by every symtest component.
//!
//! A test starts life as a *location* (`tests/test_io.f90`), becomes a *canonical name*
//! (`tests_test_io`) and finally a *mangled symbol* (`tests_test_io_` or `TESTS_TEST_IO`), which is
//! the exact name the linker sees for the compiled routine.
//!
//! ## Notes
//!
//! - This is a "naming core" crate: **no IO**, no global state, no code generation.
//! - Everything here is deterministic so the dispatcher and the registrar, which are built from the same inputs, always
//!   agree on every symbol.

pub mod errors;
pub mod naming;
pub mod platform;
pub mod toolchain;

pub use errors::NamingError;
pub use naming::{CanonicalName, NamingRules};
pub use platform::{MangledSymbol, Platform};

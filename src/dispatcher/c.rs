//! C99 dispatcher emitter.
//!
//! Each routine is declared as `extern int SYMBOL(void);`, which matches an integer function without arguments under
//! the platform's native calling convention. The argument is compared against every symbol with `strcmp`.

use std::fmt::Write;

use super::{DispatcherEmitter, DispatcherLanguage, UNKNOWN_SYMBOL_EXIT_CODE};
use crate::errors::GenerateError;
use crate::testset::TestSet;

const INDENT: &str = "    ";

pub struct CEmitter;

impl DispatcherEmitter for CEmitter {
    fn language(&self) -> DispatcherLanguage {
        DispatcherLanguage::C
    }

    fn emit(&self, tests: &TestSet) -> Result<String, GenerateError> {
        let mut out = String::new();
        write_dispatcher(&mut out, tests).map_err(|e| GenerateError::Emission(e.to_string()))?;
        Ok(out)
    }
}

fn write_dispatcher(out: &mut String, tests: &TestSet) -> std::fmt::Result {
    writeln!(out, "/* Test dispatcher generated by symtest. Do not edit.")?;
    writeln!(out, " *")?;
    writeln!(out, " * Usage: <dispatcher> <test-symbol>")?;
    writeln!(
        out,
        " * Exits with the selected routine's result, or {} for an unknown symbol.",
        UNKNOWN_SYMBOL_EXIT_CODE
    )?;
    writeln!(out, " */")?;
    writeln!(out)?;
    writeln!(out, "#include <stdio.h>")?;
    writeln!(out, "#include <string.h>")?;
    writeln!(out)?;
    writeln!(out, "#define SYMTEST_UNKNOWN_SYMBOL {}", UNKNOWN_SYMBOL_EXIT_CODE)?;
    writeln!(out)?;

    if !tests.is_empty() {
        for pair in tests {
            writeln!(
                out,
                "extern int {}(void); /* {} */",
                pair.symbol,
                comment_safe(&pair.location)
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "int main(int argc, char **argv)")?;
    writeln!(out, "{{")?;
    writeln!(out, "{INDENT}if (argc != 2) {{")?;
    writeln!(
        out,
        "{INDENT}{INDENT}fprintf(stderr, \"usage: %s <test-symbol>\\n\", argc > 0 ? argv[0] : \"dispatcher\");"
    )?;
    writeln!(out, "{INDENT}{INDENT}return SYMTEST_UNKNOWN_SYMBOL;")?;
    writeln!(out, "{INDENT}}}")?;
    writeln!(out)?;

    for pair in tests {
        writeln!(out, "{INDENT}if (strcmp(argv[1], \"{}\") == 0) {{", pair.symbol)?;
        writeln!(out, "{INDENT}{INDENT}return {}();", pair.symbol)?;
        writeln!(out, "{INDENT}}}")?;
    }
    if !tests.is_empty() {
        writeln!(out)?;
    }

    writeln!(
        out,
        "{INDENT}fprintf(stderr, \"%s: unknown test symbol '%s'\\n\", argv[0], argv[1]);"
    )?;
    writeln!(out, "{INDENT}return SYMTEST_UNKNOWN_SYMBOL;")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Keep a location from closing the surrounding block comment.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

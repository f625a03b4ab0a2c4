//! CTest registration script.
//!
//! Writes one `add_test()` call per case so the file can be `include()`d from a `CMakeLists.txt` (or dropped in as a
//! `CTestTestfile.cmake`). CTest treats exit status 0 as a pass, which is exactly the dispatcher's contract.

use std::path::PathBuf;

use super::{RegistryError, RegistryOutput, TestCase, TestRegistry};

pub struct CTestScript {
    path: PathBuf,
    lines: Vec<String>,
}

impl CTestScript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lines: vec!["# Test registrations generated by symtest. Do not edit.".to_string()],
        }
    }

    pub fn contents(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl TestRegistry for CTestScript {
    fn add(&mut self, case: &TestCase) -> Result<(), RegistryError> {
        self.lines.push(add_test_line(case));
        Ok(())
    }

    fn render(&self) -> Result<Option<RegistryOutput>, RegistryError> {
        Ok(Some(RegistryOutput {
            path: self.path.clone(),
            contents: self.contents(),
        }))
    }
}

fn add_test_line(case: &TestCase) -> String {
    format!(
        "add_test(NAME {} COMMAND {} {})",
        quote(&case.name),
        quote(&case.invocation.program.to_string_lossy()),
        quote(&case.invocation.argument)
    )
}

/// Quote a CMake argument, escaping what CMake would otherwise interpret.
fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in arg.chars() {
        if matches!(c, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::Invocation;

    fn case(name: &str, program: &str, symbol: &str) -> TestCase {
        TestCase {
            name: name.to_string(),
            invocation: Invocation {
                program: PathBuf::from(program),
                argument: symbol.to_string(),
            },
        }
    }

    #[test]
    fn test_add_test_line() {
        let line = add_test_line(&case("tests/test_io.f90", "/build/dispatcher", "tests_test_io_"));
        assert_eq!(
            line,
            r#"add_test(NAME "tests/test_io.f90" COMMAND "/build/dispatcher" "tests_test_io_")"#
        );
    }

    #[test]
    fn test_quote_escapes_cmake_specials() {
        assert_eq!(quote(r"C:\build\d.exe"), r#""C:\\build\\d.exe""#);
        assert_eq!(quote("${HOME}"), r#""\${HOME}""#);
        assert_eq!(quote("a\"b"), r#""a\"b""#);
    }

    #[test]
    fn test_contents_has_header_and_one_line_per_case() {
        let mut script = CTestScript::new("unused.cmake");
        script.add(&case("tests/a.f90", "d", "tests_a_")).unwrap();
        script.add(&case("tests/b.f90", "d", "tests_b_")).unwrap();
        let contents = script.contents();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('#'));
        assert!(lines[2].contains("\"tests_b_\""));
    }

    #[test]
    fn test_render_targets_script_path() {
        let mut script = CTestScript::new("build/tests.cmake");
        script.add(&case("tests/a.f90", "d", "tests_a_")).unwrap();
        let output = script.render().unwrap().unwrap();
        assert_eq!(output.path, PathBuf::from("build/tests.cmake"));
        assert_eq!(output.contents, script.contents());
    }
}

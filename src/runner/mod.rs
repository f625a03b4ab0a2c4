//! Sequential test runner (ctest-style)
//!
//! Executes registered [`TestCase`]s one process at a time and aggregates the results. A case passes when its process
//! exits with status 0; anything else, including death by signal or failure to start, is a failure.
//!
//! ## Traits
//!
//! Execution and reporting sit behind [`TestExecutor`] and [`TestReporter`] so the orchestration in [`run_tests`] can be
//! driven by stubs in tests, or by other executors (remote, sandboxed) later.

mod report;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::dispatcher::UNKNOWN_SYMBOL_EXIT_CODE;
use crate::registrar::TestCase;

pub use report::{ConsoleReporter, TestReporter, TestSummary, format_test_line};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What happened when a case's process ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub duration: Duration,
    /// Captured stdout followed by stderr.
    pub output: String,
}

/// Run one test case to completion.
pub trait TestExecutor {
    fn execute(&self, case: &TestCase) -> Result<ExecOutcome, RunError>;
}

/// Spawns the case's invocation as a child process and waits for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl TestExecutor for ProcessExecutor {
    fn execute(&self, case: &TestCase) -> Result<ExecOutcome, RunError> {
        let start = Instant::now();
        let output = case
            .invocation
            .command()
            .output()
            .map_err(|source| RunError::Spawn {
                program: case.invocation.program.clone(),
                source,
            })?;
        let duration = start.elapsed();

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ExecOutcome {
            exit_code: output.status.code(),
            duration,
            output: combined,
        })
    }
}

/// Result of running a single test
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed(Duration),
    Failed {
        duration: Duration,
        exit_code: Option<i32>,
        output: String,
    },
    /// The process could not be started.
    NotRun(String),
}

impl TestResult {
    pub fn from_outcome(outcome: ExecOutcome) -> Self {
        match outcome.exit_code {
            Some(0) => TestResult::Passed(outcome.duration),
            exit_code => TestResult::Failed {
                duration: outcome.duration,
                exit_code,
                output: outcome.output,
            },
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Passed(_))
    }

    pub fn duration(&self) -> Duration {
        match self {
            TestResult::Passed(d) | TestResult::Failed { duration: d, .. } => *d,
            TestResult::NotRun(_) => Duration::ZERO,
        }
    }

    /// Whether the exit status matches the dispatcher's unknown-symbol sentinel.
    ///
    /// A routine can return the same value, so this is only a hint for the report.
    pub fn looks_like_unknown_symbol(&self) -> bool {
        matches!(
            self,
            TestResult::Failed {
                exit_code: Some(UNKNOWN_SYMBOL_EXIT_CODE),
                ..
            }
        )
    }
}

/// Runner options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after the first failing case.
    pub stop_on_fail: bool,
}

/// Run every case in order and return the aggregate summary.
#[tracing::instrument(skip_all, fields(tests = cases.len()))]
pub fn run_tests(
    cases: &[TestCase],
    executor: &dyn TestExecutor,
    reporter: &mut dyn TestReporter,
    options: RunOptions,
) -> TestSummary {
    let start = Instant::now();
    reporter.on_collection_complete(cases);

    let mut summary = TestSummary::default();
    for (index, case) in cases.iter().enumerate() {
        reporter.on_test_start(index, case);

        let result = match executor.execute(case) {
            Ok(outcome) => TestResult::from_outcome(outcome),
            Err(e) => {
                tracing::warn!(test = %case.name, error = %e, "test could not be started");
                TestResult::NotRun(e.to_string())
            }
        };

        summary.record(index, case, &result);
        reporter.on_test_complete(index, case, &result);

        if options.stop_on_fail && !result.is_pass() {
            tracing::debug!(test = %case.name, "stopping after first failure");
            break;
        }
    }

    summary.duration = start.elapsed();
    reporter.on_run_complete(&summary);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registrar::Invocation;
    use std::collections::HashMap;

    /// Executor that maps each argument to a fixed exit code.
    struct StubExecutor(HashMap<&'static str, Option<i32>>);

    impl TestExecutor for StubExecutor {
        fn execute(&self, case: &TestCase) -> Result<ExecOutcome, RunError> {
            match self.0.get(case.invocation.argument.as_str()) {
                Some(&exit_code) => Ok(ExecOutcome {
                    exit_code,
                    duration: Duration::from_millis(1),
                    output: String::new(),
                }),
                None => Err(RunError::Spawn {
                    program: case.invocation.program.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        started: Vec<String>,
        completed: Vec<bool>,
        finished: bool,
    }

    impl TestReporter for RecordingReporter {
        fn on_collection_complete(&mut self, _cases: &[TestCase]) {}

        fn on_test_start(&mut self, _index: usize, case: &TestCase) {
            self.started.push(case.name.clone());
        }

        fn on_test_complete(&mut self, _index: usize, _case: &TestCase, result: &TestResult) {
            self.completed.push(result.is_pass());
        }

        fn on_run_complete(&mut self, _summary: &TestSummary) {
            self.finished = true;
        }
    }

    fn case(name: &str, symbol: &str) -> TestCase {
        TestCase {
            name: name.to_string(),
            invocation: Invocation {
                program: PathBuf::from("dispatcher"),
                argument: symbol.to_string(),
            },
        }
    }

    fn stub() -> StubExecutor {
        StubExecutor(HashMap::from([("ok", Some(0)), ("bad", Some(1)), ("killed", None)]))
    }

    #[test]
    fn test_exit_status_decides_pass_fail() {
        let cases = [case("a", "ok"), case("b", "bad"), case("c", "killed")];
        let mut reporter = RecordingReporter::default();
        let summary = run_tests(&cases, &stub(), &mut reporter, RunOptions::default());

        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(reporter.completed, [true, false, false]);
        assert!(reporter.finished);
    }

    #[test]
    fn test_spawn_failure_counts_as_failure() {
        let cases = [case("a", "missing")];
        let summary = run_tests(&cases, &stub(), &mut RecordingReporter::default(), RunOptions::default());
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures, [(1, "a".to_string())]);
    }

    #[test]
    fn test_stop_on_fail() {
        let cases = [case("a", "bad"), case("b", "ok")];
        let mut reporter = RecordingReporter::default();
        let summary = run_tests(&cases, &stub(), &mut reporter, RunOptions { stop_on_fail: true });
        assert_eq!(reporter.started, ["a"]);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn test_unknown_symbol_hint() {
        let result = TestResult::from_outcome(ExecOutcome {
            exit_code: Some(UNKNOWN_SYMBOL_EXIT_CODE),
            duration: Duration::ZERO,
            output: String::new(),
        });
        assert!(!result.is_pass());
        assert!(result.looks_like_unknown_symbol());
        assert!(!TestResult::Passed(Duration::ZERO).looks_like_unknown_symbol());
    }

    #[cfg(unix)]
    #[test]
    fn test_process_executor_reports_exit_codes() {
        let pass = TestCase {
            name: "true".to_string(),
            invocation: Invocation {
                program: PathBuf::from("true"),
                argument: "ignored".to_string(),
            },
        };
        let fail = TestCase {
            name: "false".to_string(),
            invocation: Invocation {
                program: PathBuf::from("false"),
                argument: "ignored".to_string(),
            },
        };
        assert_eq!(ProcessExecutor.execute(&pass).unwrap().exit_code, Some(0));
        assert_eq!(ProcessExecutor.execute(&fail).unwrap().exit_code, Some(1));
    }
}

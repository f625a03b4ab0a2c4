//! Test reporting
//!
//! The console format follows CTest, since that is what users of the generated registrations already read:
//!
//! ```text
//! 1/2 Test #1: tests/test_succeeds_1.f90 ...   Passed    0.01 sec
//! 2/2 Test #2: tests/test_fails_1.f90 ......***Failed    0.01 sec
//!
//! 50% tests passed, 1 tests failed out of 2
//! ```

use std::time::Duration;

use super::TestResult;
use crate::dispatcher::UNKNOWN_SYMBOL_EXIT_CODE;
use crate::registrar::TestCase;

/// Trait for reporting test execution results.
///
/// Implement this trait to customize output (JUnit XML, TAP, ...).
pub trait TestReporter {
    /// Called once with every case that will be considered.
    fn on_collection_complete(&mut self, cases: &[TestCase]);

    /// Called when a test run begins
    fn on_test_start(&mut self, _index: usize, _case: &TestCase) {}

    /// Called when a test completes
    fn on_test_complete(&mut self, index: usize, case: &TestCase, result: &TestResult);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, summary: &TestSummary);
}

/// Summary of test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSummary {
    /// Cases executed (fewer than registered when stopping on first failure).
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// 1-based test number and name of every failed case.
    pub failures: Vec<(usize, String)>,
    pub duration: Duration,
}

impl TestSummary {
    pub(super) fn record(&mut self, index: usize, case: &TestCase, result: &TestResult) {
        self.total += 1;
        if result.is_pass() {
            self.passed += 1;
        } else {
            self.failed += 1;
            self.failures.push((index + 1, case.name.clone()));
        }
    }

    /// Percentage of executed cases that passed, rounded; never 100 while anything failed.
    pub fn percent_passed(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let percent = (self.passed as f64 * 100.0 / self.total as f64).round() as u32;
        if self.failed > 0 { percent.min(99) } else { percent }
    }

    /// The aggregate line, e.g. `50% tests passed, 1 tests failed out of 2`.
    pub fn report_line(&self) -> String {
        if self.total == 0 {
            return "No tests were found!!!".to_string();
        }
        format!(
            "{}% tests passed, {} tests failed out of {}",
            self.percent_passed(),
            self.failed,
            self.total
        )
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Format one CTest-style result line.
///
/// `name_width` is the width names are padded to with dots, so status columns line up.
pub fn format_test_line(index: usize, total: usize, case: &TestCase, result: &TestResult, name_width: usize) -> String {
    let number_width = total.to_string().len();
    let status = match result {
        TestResult::Passed(_) => "   Passed",
        TestResult::Failed { .. } => "***Failed",
        TestResult::NotRun(_) => "***Not Run",
    };
    let dots = ".".repeat(name_width.saturating_sub(case.name.len()) + 3);
    let mut line = format!(
        "{:>nw$}/{} Test #{:<nw$}: {} {}{} {:>7.2} sec",
        index + 1,
        total,
        index + 1,
        case.name,
        dots,
        status,
        result.duration().as_secs_f64(),
        nw = number_width
    );
    if result.looks_like_unknown_symbol() {
        line.push_str(&format!(
            "  (exit {}: dispatcher may not know '{}')",
            UNKNOWN_SYMBOL_EXIT_CODE, case.invocation.argument
        ));
    }
    line
}

/// Default console reporter (ctest-style)
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    total: usize,
    name_width: usize,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, cases: &[TestCase]) {
        self.total = cases.len();
        self.name_width = cases.iter().map(|c| c.name.len()).max().unwrap_or(0);
        if cases.is_empty() {
            eprintln!("No tests collected");
        }
    }

    fn on_test_start(&mut self, index: usize, case: &TestCase) {
        if self.verbose {
            println!("      Start {:>2}: {}", index + 1, case.name);
        }
    }

    fn on_test_complete(&mut self, index: usize, case: &TestCase, result: &TestResult) {
        println!("{}", format_test_line(index, self.total, case, result, self.name_width));

        if self.verbose {
            match result {
                TestResult::Failed { output, exit_code, .. } => {
                    match exit_code {
                        Some(code) => println!("    exit status {}", code),
                        None => println!("    terminated by signal"),
                    }
                    for line in output.lines() {
                        println!("    {}", line);
                    }
                }
                TestResult::NotRun(reason) => println!("    {}", reason),
                TestResult::Passed(_) => {}
            }
        }
    }

    fn on_run_complete(&mut self, summary: &TestSummary) {
        println!();
        println!("{}", summary.report_line());
        println!();
        println!("Total Test time (real) = {:>7.2} sec", summary.duration.as_secs_f64());

        if !summary.failures.is_empty() {
            println!();
            println!("The following tests FAILED:");
            for (number, name) in &summary.failures {
                println!("\t{:>3} - {} (Failed)", number, name);
            }
        }
    }
}

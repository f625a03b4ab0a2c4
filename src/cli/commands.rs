//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use symtest_core::toolchain::{self, TOOLCHAINS};
use symtest_core::{NamingRules, Platform};

use super::{CliError, CliResult, ExitCode, TestInputArgs};
use crate::config::{Config, TargetSelection};
use crate::dispatcher::{self, DispatcherLanguage};
use crate::registrar::{self, CTestScript, Manifest, ManifestFile, TestRegistry};
use crate::runner::{self, ConsoleReporter, ProcessExecutor, RunOptions};
use crate::staging::Staging;
use crate::testset::TestSet;

/// Default base name of the compiled dispatcher.
const DEFAULT_DISPATCHER_NAME: &str = "symtest_dispatcher";

// ============================================================================
// Input resolution (shared between names and generate)
// ============================================================================

/// Load `--config`, or `./symtest.toml` when present.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    let cwd = env::current_dir().map_err(|e| CliError::failure(format!("Cannot determine working directory: {}", e)))?;
    Ok(Config::discover(path, &cwd)?)
}

/// Locations from the command line (arguments, then `--list`), or from the config file when none were given.
fn collect_locations(input: &TestInputArgs, config: &Config) -> CliResult<Vec<String>> {
    let mut locations = input.locations.clone();

    if let Some(list) = &input.list {
        let text = fs::read_to_string(list)
            .map_err(|e| CliError::failure(format!("Error reading test list '{}': {}", list.display(), e)))?;
        locations.extend(parse_list(&text));
    }

    if locations.is_empty() && input.list.is_none() {
        locations = config.tests.locations.clone();
    }
    Ok(locations)
}

/// One location per line; blank lines and `#` comments are skipped.
fn parse_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

fn naming_rules(input: &TestInputArgs, config: &Config) -> CliResult<NamingRules> {
    let rules = config.naming_rules()?;
    if input.suffixes.is_empty() {
        Ok(rules)
    } else {
        Ok(rules.with_suffixes(input.suffixes.iter().cloned()))
    }
}

fn platform(input: &TestInputArgs, config: &Config) -> CliResult<Platform> {
    let selection = TargetSelection {
        platform: input.platform.clone(),
        compiler: input.compiler.clone(),
        os: input.os.clone(),
    }
    .or(config.target());
    Ok(selection.resolve()?)
}

/// Build the validated test set for this invocation.
fn build_test_set(input: &TestInputArgs, config: &Config) -> CliResult<TestSet> {
    let locations = collect_locations(input, config)?;
    let rules = naming_rules(input, config)?;
    let platform = platform(input, config)?;
    tracing::debug!(tests = locations.len(), platform = %platform, "resolved test input");
    Ok(TestSet::build(&locations, &rules, platform)?)
}

// ============================================================================
// names
// ============================================================================

/// Print location, canonical name and symbol for every test.
pub fn show_names(input: &TestInputArgs, config: &Config) -> CliResult<ExitCode> {
    let tests = build_test_set(input, config)?;
    print!("{}", names_table(&tests));
    Ok(ExitCode::SUCCESS)
}

fn names_table(tests: &TestSet) -> String {
    let location_width = tests.iter().map(|p| p.location.len()).chain(["LOCATION".len()]).max().unwrap_or(0);
    let canonical_width = tests
        .iter()
        .map(|p| p.canonical.as_str().len())
        .chain(["CANONICAL".len()])
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<lw$}  {:<cw$}  SYMBOL ({})\n",
        "LOCATION",
        "CANONICAL",
        tests.platform(),
        lw = location_width,
        cw = canonical_width
    );
    for pair in tests {
        out.push_str(&format!(
            "{:<lw$}  {:<cw$}  {}\n",
            pair.location,
            pair.canonical,
            pair.symbol,
            lw = location_width,
            cw = canonical_width
        ));
    }
    out
}

// ============================================================================
// generate
// ============================================================================

/// Output options of `symtest generate`, already parsed from the command line.
#[derive(Debug, Default, Clone)]
pub struct GenerateOutputs {
    pub language: Option<DispatcherLanguage>,
    pub source: Option<PathBuf>,
    pub dispatcher: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub ctest: Option<PathBuf>,
}

impl GenerateOutputs {
    /// Fill unset outputs from the config file.
    fn or_config(self, config: &Config) -> CliResult<Self> {
        Ok(Self {
            language: match self.language {
                Some(language) => Some(language),
                None => config.dispatcher_language()?,
            },
            source: self.source.or_else(|| config.dispatcher.source.clone()),
            dispatcher: self.dispatcher.or_else(|| config.dispatcher.executable.clone()),
            manifest: self.manifest.or_else(|| config.registration.manifest.clone()),
            ctest: self.ctest.or_else(|| config.registration.ctest.clone()),
        })
    }
}

fn default_dispatcher_path() -> PathBuf {
    PathBuf::from(format!("{}{}", DEFAULT_DISPATCHER_NAME, env::consts::EXE_SUFFIX))
}

/// Make a dispatcher path spawnable as given: a bare file name would be searched on `PATH`, so it is anchored to the
/// current directory.
fn invocation_path(path: PathBuf) -> PathBuf {
    if path.is_relative() && path.components().count() == 1 {
        Path::new(".").join(path)
    } else {
        path
    }
}

/// Generate the dispatcher and registrations.
///
/// Every output is rendered and staged before the first file is written, and the staged files are committed together:
/// a naming, collision or write error leaves no partial output.
pub fn generate(input: &TestInputArgs, config: &Config, outputs: GenerateOutputs) -> CliResult<ExitCode> {
    let outputs = outputs.or_config(config)?;
    let tests = build_test_set(input, config)?;

    let language = outputs.language.unwrap_or_default();
    let source = dispatcher::generate(&tests, language)?;

    let dispatcher_path = invocation_path(outputs.dispatcher.clone().unwrap_or_else(default_dispatcher_path));
    if dispatcher_path.is_relative() && (outputs.manifest.is_some() || outputs.ctest.is_some()) {
        tracing::warn!(
            "registered tests invoke '{}' relative to the directory the tests are run from; consider an absolute path",
            dispatcher_path.display()
        );
    }
    let cases = registrar::register(&tests, &dispatcher_path);

    let mut staging = Staging::new();
    if let Some(path) = &outputs.source {
        staging.add(path, source.text.as_str());
    }

    let mut registries: Vec<Box<dyn TestRegistry>> = Vec::new();
    if let Some(path) = &outputs.manifest {
        registries.push(Box::new(ManifestFile::new(path, tests.platform(), &dispatcher_path)));
    }
    if let Some(path) = &outputs.ctest {
        registries.push(Box::new(CTestScript::new(path)));
    }
    for registry in &mut registries {
        if let Some(output) = registrar::publish(&cases, registry.as_mut())? {
            staging.add(output.path, output.contents);
        }
    }

    for path in staging.commit()? {
        tracing::info!(path = %path.display(), tests = tests.len(), "wrote generated file");
    }
    if outputs.source.is_none() {
        print!("{}", source);
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// run
// ============================================================================

/// Run every test case in a manifest.
pub fn run_manifest(
    manifest: Option<PathBuf>,
    config: &Config,
    verbose: bool,
    stop_on_fail: bool,
) -> CliResult<ExitCode> {
    let path = manifest
        .or_else(|| config.registration.manifest.clone())
        .ok_or_else(|| CliError::failure("Error: run requires --manifest (or [registration] manifest)"))?;
    let manifest = Manifest::load(&path)?;

    let mut reporter = ConsoleReporter::new(verbose);
    let summary = runner::run_tests(
        &manifest.tests,
        &ProcessExecutor,
        &mut reporter,
        RunOptions { stop_on_fail },
    );

    if summary.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Tests failed - return error with empty message (summary already printed)
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

// ============================================================================
// platforms
// ============================================================================

pub fn list_platforms() -> CliResult<ExitCode> {
    print!("{}", platforms_table());
    Ok(ExitCode::SUCCESS)
}

fn platforms_table() -> String {
    let mut out = String::from("Platforms:\n");
    for platform in Platform::ALL {
        out.push_str(&format!("  {}\n", platform));
    }
    out.push_str("\nCompilers:\n");
    for info in TOOLCHAINS {
        out.push_str(&format!(
            "  {:<10} {:<8} {:<30} {}\n",
            info.compiler,
            info.os.unwrap_or("any"),
            info.platform,
            info.note
        ));
    }
    out.push_str(&format!("\nKnown compiler ids: {}\n", toolchain::known_compilers().join(", ")));
    out
}

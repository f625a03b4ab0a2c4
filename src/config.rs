//! `symtest.toml` configuration
//!
//! Every section is optional; command-line flags override file values.
//!
//! ```toml
//! [naming]
//! suffixes = [".f90", ".F90"]
//! separators = ["/", "\\"]
//!
//! [target]
//! compiler = "GNU"          # or: platform = "lowercase-trailing-underscore"
//!
//! [dispatcher]
//! language = "c"
//! source = "build/symtest_dispatcher.c"
//! executable = "build/symtest_dispatcher"
//!
//! [registration]
//! manifest = "build/symtest.json"
//! ctest = "build/symtest_tests.cmake"
//!
//! [tests]
//! locations = ["tests/test_succeeds_1.f90", "tests/test_fails_1.f90"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use symtest_core::{NamingRules, Platform, toolchain};
use thiserror::Error;

use crate::dispatcher::DispatcherLanguage;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "symtest.toml";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    #[diagnostic(code(symtest::config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", path.display())]
    #[diagnostic(code(symtest::config::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{0}")]
    #[diagnostic(
        code(symtest::config::platform),
        help("valid platforms: uppercase-no-suffix, lowercase-trailing-underscore")
    )]
    Platform(String),

    #[error("unknown compiler '{compiler}'")]
    #[diagnostic(
        code(symtest::config::compiler),
        help("run `symtest platforms` for known compilers, or set the platform explicitly")
    )]
    UnknownCompiler { compiler: String },

    #[error("no mangling platform configured")]
    #[diagnostic(
        code(symtest::config::no_platform),
        help("pass --platform or --compiler, or set [target] in symtest.toml")
    )]
    NoPlatform,

    #[error("{0}")]
    #[diagnostic(code(symtest::config::language))]
    Language(String),

    #[error("path separators must be single characters, got '{0}'")]
    #[diagnostic(code(symtest::config::separator))]
    Separator(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub naming: NamingSection,
    pub target: TargetSection,
    pub dispatcher: DispatcherSection,
    pub registration: RegistrationSection,
    pub tests: TestsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingSection {
    pub suffixes: Option<Vec<String>>,
    pub separators: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetSection {
    pub platform: Option<String>,
    pub compiler: Option<String>,
    pub os: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherSection {
    pub language: Option<String>,
    pub source: Option<PathBuf>,
    pub executable: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrationSection {
    pub manifest: Option<PathBuf>,
    pub ctest: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestsSection {
    pub locations: Vec<String>,
}

/// Platform selection as supplied by the user, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSelection {
    pub platform: Option<String>,
    pub compiler: Option<String>,
    pub os: Option<String>,
}

impl Config {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse configuration text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load `path` if given, else `symtest.toml` from `dir` if present, else defaults.
    pub fn discover(path: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using configuration file");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Naming rules from the `[naming]` section, falling back to defaults per field.
    pub fn naming_rules(&self) -> Result<NamingRules, ConfigError> {
        let mut rules = NamingRules::default();
        if let Some(suffixes) = &self.naming.suffixes {
            rules = rules.with_suffixes(suffixes.iter().cloned());
        }
        if let Some(separators) = &self.naming.separators {
            let chars = separators
                .iter()
                .map(|s| single_char(s).ok_or_else(|| ConfigError::Separator(s.clone())))
                .collect::<Result<Vec<char>, _>>()?;
            rules = rules.with_separators(chars);
        }
        Ok(rules)
    }

    pub fn target(&self) -> TargetSelection {
        TargetSelection {
            platform: self.target.platform.clone(),
            compiler: self.target.compiler.clone(),
            os: self.target.os.clone(),
        }
    }

    pub fn dispatcher_language(&self) -> Result<Option<DispatcherLanguage>, ConfigError> {
        self.dispatcher
            .language
            .as_deref()
            .map(|s| s.parse::<DispatcherLanguage>().map_err(ConfigError::Language))
            .transpose()
    }
}

impl TargetSelection {
    /// Fill unset fields from `fallback`.
    pub fn or(self, fallback: TargetSelection) -> TargetSelection {
        // An explicit platform or compiler on the command line replaces the whole file selection.
        if self.platform.is_some() || self.compiler.is_some() {
            return TargetSelection {
                os: self.os.or(fallback.os),
                ..self
            };
        }
        TargetSelection {
            platform: fallback.platform,
            compiler: fallback.compiler,
            os: self.os.or(fallback.os),
        }
    }

    /// Resolve to a platform: an explicit platform wins, then the compiler (on `os`, or the host OS).
    pub fn resolve(&self) -> Result<Platform, ConfigError> {
        if let Some(platform) = &self.platform {
            return platform
                .parse::<Platform>()
                .map_err(|e| ConfigError::Platform(e.to_string()));
        }
        if let Some(compiler) = &self.compiler {
            let os = self.os.as_deref().unwrap_or(std::env::consts::OS);
            return toolchain::resolve(compiler, os).ok_or_else(|| ConfigError::UnknownCompiler {
                compiler: compiler.clone(),
            });
        }
        Err(ConfigError::NoPlatform)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Config {
        Config::parse(text, Path::new("symtest.toml")).unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.naming_rules().unwrap(), NamingRules::default());
        assert!(config.tests.locations.is_empty());
        assert_eq!(config.dispatcher_language().unwrap(), None);
    }

    #[test]
    fn test_full_config() {
        let config = parse(
            r#"
            [naming]
            suffixes = [".f90", ".F90"]
            separators = ["/"]

            [target]
            compiler = "Intel"
            os = "windows"

            [dispatcher]
            language = "rust"
            executable = "build/dispatcher"

            [tests]
            locations = ["tests/test_a.F90"]
            "#,
        );
        let rules = config.naming_rules().unwrap();
        assert_eq!(rules.separators, vec!['/']);
        assert_eq!(rules.normalize("tests/test_a.F90").unwrap().as_str(), "tests_test_a");
        assert_eq!(config.target().resolve().unwrap(), Platform::UppercaseNoSuffix);
        assert_eq!(config.dispatcher_language().unwrap(), Some(DispatcherLanguage::Rust));
        assert_eq!(config.dispatcher.executable, Some(PathBuf::from("build/dispatcher")));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            Config::parse("[target]\nmangling = \"upper\"\n", Path::new("x.toml")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_multi_char_separator_is_rejected() {
        let config = parse("[naming]\nseparators = [\"::\"]\n");
        assert!(matches!(config.naming_rules(), Err(ConfigError::Separator(_))));
    }

    #[test]
    fn test_explicit_platform_beats_compiler() {
        let selection = TargetSelection {
            platform: Some("uppercase-no-suffix".to_string()),
            compiler: Some("GNU".to_string()),
            os: None,
        };
        assert_eq!(selection.resolve().unwrap(), Platform::UppercaseNoSuffix);
    }

    #[test]
    fn test_cli_selection_replaces_file_selection() {
        let cli = TargetSelection {
            compiler: Some("GNU".to_string()),
            ..TargetSelection::default()
        };
        let file = TargetSelection {
            platform: Some("uppercase-no-suffix".to_string()),
            os: Some("windows".to_string()),
            ..TargetSelection::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.platform, None);
        assert_eq!(merged.os.as_deref(), Some("windows"));
        assert_eq!(merged.resolve().unwrap(), Platform::LowercaseTrailingUnderscore);
    }

    #[test]
    fn test_resolution_errors() {
        assert!(matches!(TargetSelection::default().resolve(), Err(ConfigError::NoPlatform)));
        let unknown = TargetSelection {
            compiler: Some("Absoft".to_string()),
            ..TargetSelection::default()
        };
        assert!(matches!(unknown.resolve(), Err(ConfigError::UnknownCompiler { .. })));
        let bad = TargetSelection {
            platform: Some("sideways".to_string()),
            ..TargetSelection::default()
        };
        assert!(matches!(bad.resolve(), Err(ConfigError::Platform(_))));
    }
}

//! Configuration for the `decision-tree` binary
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a config file: the explicit path (`--config` or `DECISION_TREE_CONFIG_PATH`),
//!    which must exist, else an optional `decision-tree.{toml,yaml,json}` in the
//!    working directory
//! 3. environment variables, e.g. `DECISION_TREE_LOGGING__FILTER=debug`
//! 4. programmatic overrides set on [`ConfigBuilder`]

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "DECISION_TREE_CONFIG_PATH";

const ENV_PREFIX: &str = "DECISION_TREE";
const DEFAULT_FILE_STEM: &str = "decision-tree";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub execution: ExecutionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `decision_tree=debug`
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Include the execution context in delivery log events
    pub log_context: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { log_context: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON written to stdout
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources with no overrides
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    log_filter: Option<String>,
}

impl ConfigBuilder {
    /// Explicit config file; takes precedence over `DECISION_TREE_CONFIG_PATH`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn log_filter(mut self, filter: Option<String>) -> Self {
        self.log_filter = filter;
        self
    }

    pub fn build(self) -> Result<Config> {
        let explicit_path = self
            .config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut builder = ::config::Config::builder();

        builder = match &explicit_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                builder.add_source(::config::File::from(path.as_path()).required(true))
            }
            None => builder.add_source(::config::File::with_name(DEFAULT_FILE_STEM).required(false)),
        };

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let raw = builder.build().with_context(|| match &explicit_path {
            Some(path) => format!("Failed to read config file {}", path.display()),
            None => "Failed to read configuration".to_string(),
        })?;

        let mut config: Config = raw
            .try_deserialize()
            .context("Invalid configuration")?;

        if let Some(filter) = self.log_filter {
            config.logging.filter = filter;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.logging.filter, "info");
        assert!(config.logging.ansi);
        assert!(config.execution.log_context);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_toml_file() {
        let file = config_file(
            ".toml",
            r#"
[logging]
filter = "decision_tree=debug"
ansi = false

[output]
pretty = false
"#,
        );

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .build()
            .unwrap();

        assert_eq!(config.logging.filter, "decision_tree=debug");
        assert!(!config.logging.ansi);
        assert!(!config.output.pretty);
        // Missing sections keep their defaults
        assert!(config.execution.log_context);
    }

    #[test]
    fn test_load_json_file() {
        let file = config_file(".json", r#"{"execution": {"log_context": false}}"#);

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .build()
            .unwrap();

        assert!(!config.execution.log_context);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_log_filter_override_wins() {
        let file = config_file(".toml", "[logging]\nfilter = \"warn\"\n");

        let config = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .log_filter(Some("trace".to_string()))
            .build()
            .unwrap();

        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::builder()
            .config_path(Some(PathBuf::from("/nonexistent/decision-tree.toml")))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_wrongly_typed_value_is_an_error() {
        let file = config_file(".toml", "[output]\npretty = \"sometimes\"\n");

        let result = Config::builder()
            .config_path(Some(file.path().to_path_buf()))
            .build();

        assert!(result.is_err());
    }
}

//! Configuration handling for migration_sql

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::generator::{CompatibilityMode, Dialect, DialectOptions, Generator};

/// Load configuration from a TOML file
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    parse_str(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_str(config_str: &str) -> Result<Config> {
    toml::from_str(config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))
}

/// Represents the complete migration_sql configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    pub logging: Option<LoggingConfig>,
}

/// Target dialect and how unsupported operations are handled
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratorConfig {
    pub dialect: Dialect,
    #[serde(default)]
    pub compatibility_mode: CompatibilityMode,
    /// `key=value;...` dialect sub-options, e.g. `Force Quote=false`
    pub provider_switches: Option<String>,
}

impl GeneratorConfig {
    pub fn options(&self) -> Result<DialectOptions> {
        match &self.provider_switches {
            Some(switches) => DialectOptions::from_switches(switches),
            None => Ok(DialectOptions::default()),
        }
    }

    /// Build the generator this configuration describes
    pub fn build(&self) -> Result<Generator> {
        let options = self.options()?;
        Ok(Generator::with_options(self.dialect, self.compatibility_mode, &options))
    }
}

/// Script execution settings
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Log statements instead of executing them
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub strip_comments: bool,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    pub file: Option<String>,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_stdout")]
    pub stdout: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_stdout() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL: &str = r#"
[generator]
dialect = "postgres"
compatibility_mode = "emulate"
provider_switches = "Force Quote=false"

[runner]
dry_run = true
strip_comments = true

[logging]
level = "debug"
format = "json"
stdout = false
file = "logs/migration.log"
"#;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = load_from_file(file.path()).unwrap();
        assert_eq!(config.generator.dialect, Dialect::Postgres);
        assert_eq!(config.generator.compatibility_mode, CompatibilityMode::Emulate);
        assert_eq!(
            config.runner,
            RunnerConfig {
                dry_run: true,
                strip_comments: true
            }
        );

        let logging = config.logging.unwrap();
        assert_eq!(logging.level, "debug");
        assert_eq!(logging.format, "json");
        assert_eq!(logging.file.as_deref(), Some("logs/migration.log"));
        assert!(!logging.stdout);
    }

    #[test]
    fn test_defaults() {
        let config = parse_str("[generator]\ndialect = \"sqlserver\"\n").unwrap();
        assert_eq!(config.generator.compatibility_mode, CompatibilityMode::Strict);
        assert_eq!(config.runner, RunnerConfig::default());
        assert!(config.logging.is_none());

        let config = parse_str("[generator]\ndialect = \"mysql\"\n[logging]\n").unwrap();
        let logging = config.logging.unwrap();
        assert_eq!(logging.level, "info");
        assert!(logging.stdout);
    }

    #[test]
    fn test_build_applies_switches() {
        let config = parse_str(FULL).unwrap();
        let generator = config.generator.build().unwrap();

        assert_eq!(generator.dialect(), Dialect::Postgres);
        assert_eq!(generator.compatibility_mode(), CompatibilityMode::Emulate);
        assert_eq!(generator.quoter().quote_column_name("first_name"), "first_name");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            parse_str("[generator]\ndialect = \"db2\"\n"),
            Err(Error::ConfigError(_))
        ));

        let config = parse_str("[generator]\ndialect = \"postgres\"\nprovider_switches = \"Force Quote\"\n")
            .unwrap();
        assert!(matches!(config.generator.build(), Err(Error::ConfigError(_))));

        let missing = tempfile::tempdir().unwrap().path().join("missing.toml");
        assert!(matches!(load_from_file(&missing), Err(Error::ConfigError(_))));
    }
}

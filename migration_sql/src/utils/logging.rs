//! Tracing subscriber setup from `[logging]`

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Events from this crate are filtered at the configured level
const LOG_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Install the global subscriber.
///
/// Nothing is installed without a config, or when neither a file nor
/// stdout is requested. A file wins over stdout.
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let Some(config) = config else {
        return Ok(());
    };

    let (writer, ansi) = match &config.file {
        Some(path) => (BoxMakeWriter::new(Mutex::new(open_log_file(path)?)), false),
        None if config.stdout => (BoxMakeWriter::new(std::io::stdout), true),
        None => return Ok(()),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(target_filter(parse_level(&config.level))?)
        .with_writer(writer)
        .with_ansi(ansi);

    let installed = if config.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| Error::Unknown(format!("Failed to install log subscriber: {}", e)))
}

/// `RUST_LOG` directives plus `<crate>=<level>`
fn target_filter(level: Level) -> Result<EnvFilter> {
    let directive = format!("{}={}", LOG_TARGET, level)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid log directive: {}", e)))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

fn open_log_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Parse a level name; unknown names fall back to INFO
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" warn "), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_filter_targets_this_crate() {
        let filter = target_filter(Level::DEBUG).unwrap().to_string().to_lowercase();
        assert!(filter.contains("migration_sql=debug"), "{}", filter);
    }

    #[test]
    fn test_log_file_parent_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("run.log");

        open_log_file(path.to_str().unwrap()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_nothing_installed_without_output() {
        assert!(init_logging(&None).is_ok());

        let config = LoggingConfig {
            level: "debug".to_string(),
            file: None,
            format: "json".to_string(),
            stdout: false,
        };
        assert!(init_logging(&Some(config)).is_ok());
    }
}

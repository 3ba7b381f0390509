//! migration_sql command-line tool
//!
//! Splits SQL scripts into batches and renders JSON migration expressions
//! as SQL for a chosen dialect.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use migration_sql::config::{self, Config, LoggingConfig};
use migration_sql::utils::logging::init_logging;
use migration_sql::{BatchParser, CompatibilityMode, Dialect, DialectOptions, Expression, Generator};

#[derive(Parser)]
#[command(name = "migration_sql")]
#[command(about = "Dialect-aware SQL generation and script splitting for migrations")]
#[command(version)]
struct Cli {
    /// Configuration file supplying defaults and logging
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging to stdout when no logging is configured
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a SQL script into executable batches
    Split {
        /// Script to split
        file: PathBuf,

        /// Target dialect (sqlserver, postgres, mysql, oracle, sqlite, hana, snowflake)
        #[arg(long)]
        dialect: Option<Dialect>,

        /// Drop comments from the batches
        #[arg(long)]
        strip_comments: bool,
    },

    /// Render a JSON array of migration expressions as SQL
    Generate {
        /// JSON file holding the expressions
        file: PathBuf,

        #[arg(long)]
        dialect: Option<Dialect>,

        /// strict fails on unsupported operations, emulate skips them
        #[arg(long)]
        mode: Option<CompatibilityMode>,

        /// Provider switches, e.g. "Force Quote=false"
        #[arg(long)]
        switches: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Some(
            config::load_from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
        ),
        None => None,
    };

    let logging = config
        .as_ref()
        .and_then(|c| c.logging.clone())
        .or_else(|| {
            cli.verbose.then(|| LoggingConfig {
                level: "debug".to_string(),
                file: None,
                format: "text".to_string(),
                stdout: true,
            })
        });
    init_logging(&logging)?;

    match cli.command {
        Commands::Split {
            file,
            dialect,
            strip_comments,
        } => {
            let dialect = resolve_dialect(dialect, config.as_ref())?;
            let strip_comments =
                strip_comments || config.as_ref().map(|c| c.runner.strip_comments).unwrap_or(false);
            handle_split(&file, dialect, strip_comments)
        }
        Commands::Generate {
            file,
            dialect,
            mode,
            switches,
        } => {
            let generator = build_generator(dialect, mode, switches, config.as_ref())?;
            handle_generate(&file, &generator)
        }
    }
}

fn resolve_dialect(dialect: Option<Dialect>, config: Option<&Config>) -> anyhow::Result<Dialect> {
    match dialect.or_else(|| config.map(|c| c.generator.dialect)) {
        Some(dialect) => Ok(dialect),
        None => bail!("No dialect given; pass --dialect or a --config file"),
    }
}

fn build_generator(
    dialect: Option<Dialect>,
    mode: Option<CompatibilityMode>,
    switches: Option<String>,
    config: Option<&Config>,
) -> anyhow::Result<Generator> {
    let dialect = resolve_dialect(dialect, config)?;
    let mode = mode
        .or_else(|| config.map(|c| c.generator.compatibility_mode))
        .unwrap_or_default();
    let switches = switches.or_else(|| config.and_then(|c| c.generator.provider_switches.clone()));
    let options = match switches {
        Some(switches) => DialectOptions::from_switches(&switches)?,
        None => DialectOptions::default(),
    };

    Ok(Generator::with_options(dialect, mode, &options))
}

fn handle_split(file: &Path, dialect: Dialect, strip_comments: bool) -> anyhow::Result<()> {
    let script =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let parser = BatchParser::for_dialect(dialect).strip_comments(strip_comments);

    for (i, batch) in parser.batches(&script).enumerate() {
        match batch.repeat_count() {
            1 => println!("-- batch {}", i + 1),
            n => println!("-- batch {} (x{})", i + 1, n),
        }
        println!("{}\n", batch.sql);
    }

    Ok(())
}

fn handle_generate(file: &Path, generator: &Generator) -> anyhow::Result<()> {
    let json =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let expressions: Vec<Expression> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse expressions in {}", file.display()))?;

    for (i, expression) in expressions.iter().enumerate() {
        let sql = generator
            .generate(expression)
            .with_context(|| format!("Expression {} ({})", i + 1, expression.kind()))?;

        if !sql.is_empty() {
            println!("{}\n", sql);
        }
    }

    Ok(())
}

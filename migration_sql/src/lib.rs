//! migration_sql: dialect-aware SQL generation for schema migrations
//!
//! Migration expressions (create table, add column, insert rows, ...) are
//! turned into SQL for a chosen database dialect by a [`Generator`], and
//! hand-written multi-statement scripts are split into executable batches
//! by a [`BatchParser`]. Running the SQL is left to an [`Executor`]
//! supplied by the caller.

pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod generator;
pub mod model;
pub mod utils;

// Re-export main types for easier access
pub use batch::{BatchKind, BatchParser, SqlBatch};
pub use config::Config;
pub use db::{Executor, SqlExecutor};
pub use error::{Error, Result};
pub use generator::{CompatibilityMode, Dialect, DialectOptions, Generator};
pub use model::{Expression, LiteralValue};

/// Build a generator from the configuration file at `config_path`
pub fn init(config_path: &str) -> Result<Generator> {
    let config = config::load_from_file(config_path)?;
    utils::logging::init_logging(&config.logging)?;
    config.generator.build()
}

//! Database module for migration_sql
//!
//! Connections stay with the caller; this module only drives them.

pub mod executor;

pub use executor::{Executor, SqlExecutor};

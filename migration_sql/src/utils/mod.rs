//! Utilities for migration_sql
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{
    format_name, get_default_constraint_name, get_foreign_key_name, get_index_name,
    get_primary_key_name, get_unique_constraint_name, truncate_identifier,
};

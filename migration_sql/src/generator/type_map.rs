//! Abstract column types to dialect type names
//!
//! Each `DbType` owns a sorted set of capacity buckets. Capacity 0 holds the
//! type's default form; a sized lookup takes the smallest bucket that fits.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::generator::dialect::Dialect;
use crate::model::types::DbType;

/// Largest capacity a bucket can declare
pub const MAX_CAPACITY: u32 = i32::MAX as u32;

#[derive(Debug, Clone)]
pub struct TypeMap {
    dialect: Dialect,
    templates: HashMap<DbType, BTreeMap<u32, String>>,
}

impl TypeMap {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            templates: HashMap::new(),
        }
    }

    /// Register the default form of a type
    pub fn set(&mut self, db_type: DbType, template: &str) -> &mut Self {
        self.set_sized(db_type, 0, template)
    }

    /// Register the template used for sizes up to `capacity`
    pub fn set_sized(&mut self, db_type: DbType, capacity: u32, template: &str) -> &mut Self {
        self.templates
            .entry(db_type)
            .or_default()
            .insert(capacity, template.to_string());
        self
    }

    /// Whether any template exists for `db_type`
    pub fn supports(&self, db_type: DbType) -> bool {
        self.templates.contains_key(&db_type)
    }

    /// Resolve `db_type` with an optional size and precision
    pub fn get(&self, db_type: DbType, size: Option<u32>, precision: Option<u32>) -> Result<String> {
        let buckets = self.templates.get(&db_type).ok_or_else(|| {
            Error::TypeMappingError(format!("{} has no mapping for DbType {}", self.dialect, db_type))
        })?;

        let size = size.unwrap_or(0);
        let sized_buckets = buckets.range(1..).next().is_some();

        let template = if size == 0 || !sized_buckets {
            buckets.get(&0).ok_or_else(|| {
                Error::TypeMappingError(format!(
                    "{} needs a size for DbType {}",
                    self.dialect, db_type
                ))
            })?
        } else {
            buckets
                .range(size..)
                .next()
                .map(|(_, template)| template)
                .ok_or_else(|| {
                    Error::TypeMappingError(format!(
                        "{} cannot map DbType {} with size {}",
                        self.dialect, db_type, size
                    ))
                })?
        };

        Ok(template
            .replace("$size", &size.to_string())
            .replace("$precision", &precision.unwrap_or(0).to_string()))
    }
}

//! Descriptor records for schema objects
//!
//! These are plain data: the fluent migration API builds them, a generator
//! reads them once while rendering SQL and never mutates them.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::value::LiteralValue;

/// Portable column types, resolved to native syntax by a dialect's type map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DbType {
    AnsiString,
    AnsiStringFixedLength,
    Binary,
    Boolean,
    Byte,
    Currency,
    Date,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    String,
    StringFixedLength,
    Time,
    UInt16,
    UInt32,
    UInt64,
    Xml,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Represents a column in a create/alter statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub db_type: Option<DbType>,
    /// Native type text used verbatim; takes precedence over `db_type`
    #[serde(default)]
    pub custom_type: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub precision: Option<u32>,
    /// `None` leaves nullability unspecified
    #[serde(default)]
    pub nullable: Option<bool>,
    /// `None` means no default; `Some(LiteralValue::Null)` is `DEFAULT NULL`
    #[serde(default)]
    pub default_value: Option<LiteralValue>,
    #[serde(default)]
    pub is_identity: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub primary_key_name: Option<String>,
    #[serde(default)]
    pub collation: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Value written into existing rows before a NOT NULL column is enforced
    #[serde(default)]
    pub set_existing_rows_to: Option<LiteralValue>,
}

impl ColumnDefinition {
    /// Create a column of a portable type
    pub fn new(name: &str, db_type: DbType) -> Self {
        Self {
            name: name.to_string(),
            db_type: Some(db_type),
            custom_type: None,
            size: None,
            precision: None,
            nullable: None,
            default_value: None,
            is_identity: false,
            is_primary_key: false,
            primary_key_name: None,
            collation: None,
            description: None,
            set_existing_rows_to: None,
        }
    }

    /// Create a column with a native type string
    pub fn custom(name: &str, custom_type: &str) -> Self {
        Self {
            db_type: None,
            custom_type: Some(custom_type.to_string()),
            ..Self::new(name, DbType::String)
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    /// Set a default value for the column
    pub fn default_value(mut self, value: impl Into<LiteralValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark as primary key with an explicit constraint name
    pub fn primary_key_named(mut self, name: &str) -> Self {
        self.is_primary_key = true;
        self.primary_key_name = Some(name.to_string());
        self
    }

    pub fn collation(mut self, collation: &str) -> Self {
        self.collation = Some(collation.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn set_existing_rows_to(mut self, value: impl Into<LiteralValue>) -> Self {
        self.set_existing_rows_to = Some(value.into());
        self
    }

    /// Whether the column rejects NULL; unset counts as NOT NULL
    pub fn is_not_null(&self) -> bool {
        self.nullable != Some(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Column name cannot be empty"));
        }

        if self.db_type.is_none() && self.custom_type.as_deref().map_or(true, str::is_empty) {
            return Err(Error::validation(format!(
                "Column '{}' has neither a type nor a custom type",
                self.name
            )));
        }

        Ok(())
    }
}

/// Represents a table and the objects created with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TableDefinition {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema_name: None,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            description: None,
        }
    }

    pub fn in_schema(mut self, schema_name: &str) -> Self {
        self.schema_name = Some(schema_name.to_string());
        self
    }

    /// Add a column to the table
    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a foreign key to the table
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyDefinition) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Add an index to the table
    pub fn with_index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Columns flagged as primary key, in declaration order
    pub fn primary_key_columns(&self) -> Vec<&ColumnDefinition> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Table name cannot be empty"));
        }

        if self.columns.is_empty() {
            return Err(Error::validation(format!(
                "Table '{}' must define at least one column",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            column.validate().map_err(|e| in_table(e, &self.name))?;
            if !seen.insert(column.name.to_lowercase()) {
                return Err(Error::validation(format!(
                    "Column '{}' is defined more than once in table '{}'",
                    column.name, self.name
                )));
            }
        }

        for foreign_key in &self.foreign_keys {
            foreign_key.validate()?;
        }

        for index in &self.indexes {
            index.validate()?;
        }

        Ok(())
    }
}

/// Attach the owning table to a validation message
pub(crate) fn in_table(error: Error, table: &str) -> Error {
    match error {
        Error::ValidationError(message) => {
            Error::ValidationError(format!("{} (table '{}')", message, table))
        }
        other => other,
    }
}

/// Referential action for ON DELETE / ON UPDATE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    #[default]
    None,
    Cascade,
    SetNull,
    SetDefault,
}

impl Rule {
    /// SQL spelling of the action; `None` renders nothing
    pub fn as_sql(&self) -> Option<&'static str> {
        match self {
            Rule::None => None,
            Rule::Cascade => Some("CASCADE"),
            Rule::SetNull => Some("SET NULL"),
            Rule::SetDefault => Some("SET DEFAULT"),
        }
    }
}

/// Represents a foreign key constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub foreign_table: String,
    #[serde(default)]
    pub foreign_table_schema: Option<String>,
    pub foreign_columns: Vec<String>,
    pub primary_table: String,
    #[serde(default)]
    pub primary_table_schema: Option<String>,
    pub primary_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Rule,
    #[serde(default)]
    pub on_update: Rule,
}

impl ForeignKeyDefinition {
    /// Foreign key from `foreign_table(foreign_columns)` to `primary_table(primary_columns)`
    pub fn new(
        foreign_table: &str,
        foreign_columns: &[&str],
        primary_table: &str,
        primary_columns: &[&str],
    ) -> Self {
        Self {
            name: None,
            foreign_table: foreign_table.to_string(),
            foreign_table_schema: None,
            foreign_columns: foreign_columns.iter().map(|c| c.to_string()).collect(),
            primary_table: primary_table.to_string(),
            primary_table_schema: None,
            primary_columns: primary_columns.iter().map(|c| c.to_string()).collect(),
            on_delete: Rule::None,
            on_update: Rule::None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn on_delete(mut self, rule: Rule) -> Self {
        self.on_delete = rule;
        self
    }

    pub fn on_update(mut self, rule: Rule) -> Self {
        self.on_update = rule;
        self
    }

    /// Display name used in error messages
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{} -> {}", self.foreign_table, self.primary_table))
    }

    pub fn validate(&self) -> Result<()> {
        if self.foreign_table.trim().is_empty() || self.primary_table.trim().is_empty() {
            return Err(Error::validation(format!(
                "Foreign key '{}' must name both the foreign and the primary table",
                self.label()
            )));
        }

        if self.foreign_table == self.primary_table
            && self.foreign_table_schema == self.primary_table_schema
        {
            return Err(Error::validation(format!(
                "Foreign key '{}' cannot reference its own table",
                self.label()
            )));
        }

        if self.foreign_columns.is_empty() || self.primary_columns.is_empty() {
            return Err(Error::validation(format!(
                "Foreign key '{}' must specify foreign and primary columns",
                self.label()
            )));
        }

        if self.foreign_columns.len() != self.primary_columns.len() {
            return Err(Error::validation(format!(
                "Foreign key '{}' has {} foreign column(s) but {} primary column(s)",
                self.label(),
                self.foreign_columns.len(),
                self.primary_columns.len()
            )));
        }

        Ok(())
    }
}

/// Sort direction of an index column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// One column of an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexColumnDefinition {
    pub name: String,
    #[serde(default)]
    pub direction: Direction,
}

impl IndexColumnDefinition {
    pub fn ascending(name: &str) -> Self {
        Self { name: name.to_string(), direction: Direction::Ascending }
    }

    pub fn descending(name: &str) -> Self {
        Self { name: name.to_string(), direction: Direction::Descending }
    }
}

/// Represents an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Derived from the naming convention when unset
    #[serde(default)]
    pub name: Option<String>,
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_clustered: bool,
    pub columns: Vec<IndexColumnDefinition>,
}

impl IndexDefinition {
    pub fn new(table_name: &str) -> Self {
        Self {
            name: None,
            table_name: table_name.to_string(),
            schema_name: None,
            is_unique: false,
            is_clustered: false,
            columns: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn clustered(mut self) -> Self {
        self.is_clustered = true;
        self
    }

    pub fn with_column(mut self, column: IndexColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(Error::validation("Index table name cannot be empty"));
        }

        if self.columns.is_empty() {
            return Err(Error::validation(format!(
                "Index on table '{}' must have at least one column",
                self.table_name
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintType {
    PrimaryKey,
    Unique,
}

/// Represents a primary key or unique constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintDefinition {
    pub constraint_type: ConstraintType,
    #[serde(default)]
    pub name: Option<String>,
    pub table_name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub columns: IndexSet<String>,
}

impl ConstraintDefinition {
    pub fn new(constraint_type: ConstraintType, table_name: &str, columns: &[&str]) -> Self {
        Self {
            constraint_type,
            name: None,
            table_name: table_name.to_string(),
            schema_name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.table_name.trim().is_empty() {
            return Err(Error::validation("Constraint table name cannot be empty"));
        }

        if self.columns.is_empty() {
            return Err(Error::validation(format!(
                "Constraint on table '{}' must have at least one column",
                self.table_name
            )));
        }

        Ok(())
    }
}

/// Represents a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDefinition {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    #[serde(default)]
    pub increment: Option<i64>,
    #[serde(default)]
    pub min_value: Option<i64>,
    #[serde(default)]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub start_with: Option<i64>,
    #[serde(default)]
    pub cache: Option<i64>,
    #[serde(default)]
    pub cycle: bool,
}

impl SequenceDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema_name: None,
            increment: None,
            min_value: None,
            max_value: None,
            start_with: None,
            cache: None,
            cycle: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Sequence name cannot be empty"));
        }

        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(Error::validation(format!(
                    "Sequence '{}' has MINVALUE {} greater than MAXVALUE {}",
                    self.name, min, max
                )));
            }
        }

        if self.increment == Some(0) {
            return Err(Error::validation(format!(
                "Sequence '{}' cannot increment by 0",
                self.name
            )));
        }

        Ok(())
    }
}

/// Represents a view; `definition` is the SELECT it wraps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub definition: String,
}

/// Represents a function; `body` is the complete CREATE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub body: String,
}

/// Represents a stored procedure; `body` is the complete CREATE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    pub name: String,
    #[serde(default)]
    pub schema_name: Option<String>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_requires_columns() {
        let err = TableDefinition::new("users").validate().unwrap_err();
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let table = TableDefinition::new("users")
            .with_column(ColumnDefinition::new("id", DbType::Int32))
            .with_column(ColumnDefinition::new("ID", DbType::Int64));
        let err = table.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_column_without_type_names_table() {
        let mut column = ColumnDefinition::custom("c", "");
        column.custom_type = None;
        let err = TableDefinition::new("t").with_column(column).validate().unwrap_err();
        assert!(err.to_string().contains("'c'"));
        assert!(err.to_string().contains("table 't'"));
    }

    #[test]
    fn test_foreign_key_rules() {
        let fk = ForeignKeyDefinition::new("orders", &["a", "b"], "customers", &["id"]);
        assert!(fk.validate().unwrap_err().to_string().contains("2 foreign column(s) but 1"));

        let fk = ForeignKeyDefinition::new("orders", &["parent"], "orders", &["id"]);
        assert!(fk.validate().is_err());

        let fk = ForeignKeyDefinition::new("orders", &[], "customers", &[]);
        assert!(fk.validate().is_err());

        let fk = ForeignKeyDefinition::new("orders", &["customer_id"], "customers", &["id"]);
        assert!(fk.validate().is_ok());
    }

    #[test]
    fn test_constraint_columns_are_a_set() {
        let constraint =
            ConstraintDefinition::new(ConstraintType::Unique, "users", &["email", "email", "name"]);
        assert_eq!(constraint.columns.len(), 2);
        assert_eq!(constraint.columns.get_index(0).map(String::as_str), Some("email"));
    }

    #[test]
    fn test_sequence_bounds() {
        let mut sequence = SequenceDefinition::new("seq");
        sequence.min_value = Some(10);
        sequence.max_value = Some(1);
        assert!(sequence.validate().is_err());
    }
}

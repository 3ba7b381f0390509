//! Dialect profiles
//!
//! A `DialectProfile` is everything the generator needs to know about one
//! database engine: its type map, its quoter, the order of column clauses and
//! the statement templates. Profiles are built once and never mutated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::generator::dialects;
use crate::generator::quoter::Quoter;
use crate::generator::type_map::TypeMap;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    SqlServer,
    Postgres,
    MySql,
    Oracle,
    Sqlite,
    Hana,
    Snowflake,
}

impl Dialect {
    pub const ALL: [Dialect; 7] = [
        Dialect::SqlServer,
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Oracle,
        Dialect::Sqlite,
        Dialect::Hana,
        Dialect::Snowflake,
    ];
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::SqlServer => "SQL Server",
            Dialect::Postgres => "PostgreSQL",
            Dialect::MySql => "MySQL",
            Dialect::Oracle => "Oracle",
            Dialect::Sqlite => "SQLite",
            Dialect::Hana => "SAP HANA",
            Dialect::Snowflake => "Snowflake",
        };
        f.write_str(name)
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlserver" | "mssql" | "sql_server" => Ok(Dialect::SqlServer),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            "oracle" => Ok(Dialect::Oracle),
            "sqlite" => Ok(Dialect::Sqlite),
            "hana" | "sap_hana" => Ok(Dialect::Hana),
            "snowflake" => Ok(Dialect::Snowflake),
            other => Err(Error::ConfigError(format!("Unknown dialect: {}", other))),
        }
    }
}

/// What to do when a dialect cannot express an operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    /// Fail with `Error::NotSupported`
    #[default]
    Strict,
    /// Skip the operation and log a warning
    Emulate,
}

impl FromStr for CompatibilityMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(CompatibilityMode::Strict),
            "emulate" | "loose" => Ok(CompatibilityMode::Emulate),
            other => Err(Error::ConfigError(format!("Unknown compatibility mode: {}", other))),
        }
    }
}

/// One fragment of a column definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClause {
    Name,
    Type,
    Collation,
    Nullable,
    Default,
    PrimaryKey,
    Identity,
    Description,
}

/// Dialect sub-options parsed from a provider switches string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialectOptions {
    /// `QuoteIdentifiers`: force quoting on or off
    pub quote_identifiers: Option<bool>,
    /// `Force Quote`: Postgres quotes every identifier when true
    pub force_quote: Option<bool>,
}

impl DialectOptions {
    /// Parse `key=value;key=value` provider switches
    pub fn from_switches(switches: &str) -> Result<Self> {
        let mut options = DialectOptions::default();

        for (key, value) in parse_provider_switches(switches)? {
            match key.as_str() {
                "quoteidentifiers" => options.quote_identifiers = Some(parse_bool(&key, &value)?),
                "forcequote" => options.force_quote = Some(parse_bool(&key, &value)?),
                _ => debug!(switch = %key, "Ignoring unknown provider switch"),
            }
        }

        Ok(options)
    }
}

/// Split a provider switches string into normalized `(key, value)` pairs.
///
/// Keys are lower-cased with whitespace removed; values lose surrounding
/// quotes.
pub fn parse_provider_switches(switches: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();

    for part in switches.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (key, value) = part.split_once('=').ok_or_else(|| {
            Error::ConfigError(format!("Provider switch '{}' is not a key=value pair", part))
        })?;

        let key: String = key
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);

        pairs.push((key, value.to_string()));
    }

    Ok(pairs)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(Error::ConfigError(format!(
            "Provider switch '{}' expects a boolean, got '{}'",
            key, value
        ))),
    }
}

/// Statement templates with `{placeholder}` slots.
///
/// `None` means the dialect has no way to express the statement; the
/// generator then applies the profile's compatibility mode.
#[derive(Debug, Clone)]
pub struct Templates {
    pub create_schema: Option<&'static str>,
    pub drop_schema: Option<&'static str>,
    pub alter_schema: Option<&'static str>,
    pub create_table: &'static str,
    pub drop_table: &'static str,
    pub drop_table_if_exists: Option<&'static str>,
    pub rename_table: Option<&'static str>,
    pub add_column: Option<&'static str>,
    pub alter_column: Option<&'static str>,
    pub drop_column: Option<&'static str>,
    pub rename_column: Option<&'static str>,
    pub add_foreign_key: Option<&'static str>,
    pub drop_foreign_key: Option<&'static str>,
    pub create_index: Option<&'static str>,
    pub drop_index: Option<&'static str>,
    pub add_constraint: Option<&'static str>,
    pub drop_constraint: Option<&'static str>,
    pub set_default: Option<&'static str>,
    pub drop_default: Option<&'static str>,
    pub create_sequence: Option<&'static str>,
    pub drop_sequence: Option<&'static str>,
    pub insert: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub create_view: &'static str,
    pub drop_view: &'static str,
    /// Function and procedure bodies are complete statements
    pub create_routine: Option<&'static str>,
    pub drop_function: Option<&'static str>,
    pub drop_procedure: Option<&'static str>,
}

impl Templates {
    /// ANSI-flavoured templates each dialect starts from
    pub fn generic() -> Self {
        Self {
            create_schema: Some("CREATE SCHEMA {schema}"),
            drop_schema: Some("DROP SCHEMA {schema}"),
            alter_schema: None,
            create_table: "CREATE TABLE {table} ({columns})",
            drop_table: "DROP TABLE {table}",
            drop_table_if_exists: Some("DROP TABLE IF EXISTS {table}"),
            rename_table: Some("ALTER TABLE {table} RENAME TO {new_name}"),
            add_column: Some("ALTER TABLE {table} ADD COLUMN {column}"),
            alter_column: Some("ALTER TABLE {table} ALTER COLUMN {column}"),
            drop_column: Some("ALTER TABLE {table} DROP COLUMN {column}"),
            rename_column: Some("ALTER TABLE {table} RENAME COLUMN {old_name} TO {new_name}"),
            add_foreign_key: Some("ALTER TABLE {table} ADD {constraint}"),
            drop_foreign_key: Some("ALTER TABLE {table} DROP CONSTRAINT {name}"),
            create_index: Some("CREATE {unique}{clustered}INDEX {name} ON {table} ({columns})"),
            drop_index: Some("DROP INDEX {name}"),
            add_constraint: Some("ALTER TABLE {table} ADD CONSTRAINT {name} {kind} ({columns})"),
            drop_constraint: Some("ALTER TABLE {table} DROP CONSTRAINT {name}"),
            set_default: Some("ALTER TABLE {table} ALTER COLUMN {column} SET DEFAULT {value}"),
            drop_default: Some("ALTER TABLE {table} ALTER COLUMN {column} DROP DEFAULT"),
            create_sequence: Some("CREATE SEQUENCE {name}{options}"),
            drop_sequence: Some("DROP SEQUENCE {name}"),
            insert: "INSERT INTO {table} ({columns}) VALUES ({values})",
            update: "UPDATE {table} SET {set} WHERE {where}",
            delete: "DELETE FROM {table} WHERE {where}",
            create_view: "CREATE VIEW {name} AS {definition}",
            drop_view: "DROP VIEW {name}",
            create_routine: Some("{body}"),
            drop_function: Some("DROP FUNCTION {name}"),
            drop_procedure: Some("DROP PROCEDURE {name}"),
        }
    }
}

/// Read-only description of one dialect
#[derive(Debug, Clone)]
pub struct DialectProfile {
    pub dialect: Dialect,
    pub type_map: TypeMap,
    pub quoter: Quoter,
    pub column_clause_order: Vec<ColumnClause>,
    pub templates: Templates,
    pub compatibility_mode: CompatibilityMode,
    /// Longest identifier the engine accepts; generated names are truncated to it
    pub max_identifier_length: usize,
}

impl DialectProfile {
    pub fn new(dialect: Dialect, compatibility_mode: CompatibilityMode, options: &DialectOptions) -> Self {
        let mut profile = match dialect {
            Dialect::SqlServer => dialects::sqlserver::profile(options),
            Dialect::Postgres => dialects::postgres::profile(options),
            Dialect::MySql => dialects::mysql::profile(options),
            Dialect::Oracle => dialects::oracle::profile(options),
            Dialect::Sqlite => dialects::sqlite::profile(options),
            Dialect::Hana => dialects::hana::profile(options),
            Dialect::Snowflake => dialects::snowflake::profile(options),
        };
        profile.compatibility_mode = compatibility_mode;
        profile
    }

    /// Apply the compatibility mode to an operation the dialect cannot express.
    ///
    /// Strict mode fails; emulate mode yields an empty statement.
    pub fn unsupported(&self, operation: impl fmt::Display) -> Result<String> {
        match self.compatibility_mode {
            CompatibilityMode::Strict => Err(Error::NotSupported(format!(
                "{} does not support {}",
                self.dialect, operation
            ))),
            CompatibilityMode::Emulate => {
                warn!(dialect = %self.dialect, "Skipping unsupported operation: {}", operation);
                Ok(String::new())
            }
        }
    }
}

/// Column clause order shared by most dialects
pub fn standard_clause_order() -> Vec<ColumnClause> {
    vec![
        ColumnClause::Name,
        ColumnClause::Type,
        ColumnClause::Collation,
        ColumnClause::Nullable,
        ColumnClause::Default,
        ColumnClause::PrimaryKey,
        ColumnClause::Identity,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("mssql".parse::<Dialect>().unwrap(), Dialect::SqlServer);
        assert!("db2".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_parse_provider_switches() {
        let pairs = parse_provider_switches("Force Quote=false; QuoteIdentifiers = 'true' ;").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("forcequote".to_string(), "false".to_string()),
                ("quoteidentifiers".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_options_from_switches() {
        let options = DialectOptions::from_switches("ForceQuote=false;Unknown=1").unwrap();
        assert_eq!(options.force_quote, Some(false));
        assert_eq!(options.quote_identifiers, None);

        assert!(DialectOptions::from_switches("QuoteIdentifiers").is_err());
        assert!(DialectOptions::from_switches("QuoteIdentifiers=maybe").is_err());
        assert_eq!(DialectOptions::from_switches("").unwrap(), DialectOptions::default());
    }

    #[test]
    fn test_unsupported_follows_mode() {
        let options = DialectOptions::default();
        let strict = DialectProfile::new(Dialect::Sqlite, CompatibilityMode::Strict, &options);
        let emulate = DialectProfile::new(Dialect::Sqlite, CompatibilityMode::Emulate, &options);

        match strict.unsupported("ALTER COLUMN") {
            Err(Error::NotSupported(message)) => assert!(message.contains("SQLite")),
            other => panic!("expected NotSupported, got {:?}", other),
        }
        assert_eq!(emulate.unsupported("ALTER COLUMN").unwrap(), "");
    }
}

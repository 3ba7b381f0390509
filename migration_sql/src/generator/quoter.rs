//! Identifier quoting and literal formatting
//!
//! Every identifier and value that ends up in generated SQL passes through a
//! `Quoter`, so escaping rules live in one place per dialect.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::generator::dialect::Dialect;
use crate::model::value::{LiteralValue, SystemMethod};
use crate::utils::naming::is_sql_keyword;

static SIMPLE_LOWERCASE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_$]*$").expect("valid identifier regex"));

/// When identifiers get wrapped in quote characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePolicy {
    Always,
    /// Only names that would otherwise be case-folded or are reserved words
    WhenNeeded,
    Never,
}

#[derive(Debug, Clone)]
pub struct Quoter {
    dialect: Dialect,
    open_quote: &'static str,
    close_quote: &'static str,
    policy: QuotePolicy,
    default_schema: Option<&'static str>,
}

impl Quoter {
    pub fn new(dialect: Dialect, open_quote: &'static str, close_quote: &'static str) -> Self {
        Self {
            dialect,
            open_quote,
            close_quote,
            policy: QuotePolicy::Always,
            default_schema: None,
        }
    }

    pub fn with_policy(mut self, policy: QuotePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Schema used to qualify names that don't name one
    pub fn with_default_schema(mut self, schema: &'static str) -> Self {
        self.default_schema = Some(schema);
        self
    }

    pub fn policy(&self) -> QuotePolicy {
        self.policy
    }

    pub fn default_schema(&self) -> Option<&'static str> {
        self.default_schema
    }

    /// Whether `name` is already wrapped in this dialect's quotes
    pub fn is_quoted(&self, name: &str) -> bool {
        name.len() >= self.open_quote.len() + self.close_quote.len()
            && name.starts_with(self.open_quote)
            && name.ends_with(self.close_quote)
    }

    fn needs_quoting(&self, name: &str) -> bool {
        match self.policy {
            QuotePolicy::Always => true,
            QuotePolicy::Never => false,
            QuotePolicy::WhenNeeded => {
                !SIMPLE_LOWERCASE_IDENTIFIER.is_match(name) || is_sql_keyword(name)
            }
        }
    }

    /// Quote a single identifier, doubling embedded close quotes
    pub fn quote(&self, name: &str) -> String {
        if name.is_empty() || self.is_quoted(name) || !self.needs_quoting(name) {
            return name.to_string();
        }

        let escaped = name.replace(self.close_quote, &self.close_quote.repeat(2));
        format!("{}{}{}", self.open_quote, escaped, self.close_quote)
    }

    /// Inverse of `quote`
    pub fn unquote(&self, name: &str) -> String {
        if !self.is_quoted(name) {
            return name.to_string();
        }

        let inner = &name[self.open_quote.len()..name.len() - self.close_quote.len()];
        inner.replace(&self.close_quote.repeat(2), self.close_quote)
    }

    pub fn quote_column_name(&self, name: &str) -> String {
        self.quote(name)
    }

    pub fn quote_schema_name(&self, name: &str) -> String {
        self.quote(name)
    }

    pub fn quote_index_name(&self, name: &str) -> String {
        self.quote(name)
    }

    pub fn quote_constraint_name(&self, name: &str) -> String {
        self.quote(name)
    }

    /// Quote a table name, qualified by its schema or the dialect's default schema
    pub fn quote_table_name(&self, name: &str, schema: Option<&str>) -> String {
        match schema.filter(|s| !s.is_empty()).or(self.default_schema) {
            Some(schema) => format!("{}.{}", self.quote_schema_name(schema), self.quote(name)),
            None => self.quote(name),
        }
    }

    /// Sequences, views and routines are qualified like tables
    pub fn quote_object_name(&self, name: &str, schema: Option<&str>) -> String {
        self.quote_table_name(name, schema)
    }

    /// Quote a comma separated column list
    pub fn quote_column_list<S: AsRef<str>>(&self, columns: &[S]) -> String {
        columns
            .iter()
            .map(|c| self.quote_column_name(c.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render text as a string literal
    pub fn quote_string(&self, value: &str) -> String {
        match self.dialect {
            Dialect::SqlServer => format!("N'{}'", value.replace('\'', "''")),
            Dialect::MySql => format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")),
            _ => format!("'{}'", value.replace('\'', "''")),
        }
    }

    /// Render a value as a SQL literal
    pub fn quote_value(&self, value: &LiteralValue) -> Result<String> {
        let rendered = match value {
            LiteralValue::Null => "NULL".to_string(),
            LiteralValue::String(s) | LiteralValue::Enum(s) => self.quote_string(s),
            LiteralValue::Char(c) => self.quote_string(&c.to_string()),
            LiteralValue::Bool(b) => self.format_bool(*b).to_string(),
            LiteralValue::Int(i) => i.to_string(),
            LiteralValue::UInt(u) => u.to_string(),
            LiteralValue::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::validation(format!("{} cannot be written as a SQL literal", f)));
                }
                f.to_string()
            }
            LiteralValue::Guid(guid) => match self.dialect {
                Dialect::Oracle => format!("HEXTORAW('{}')", guid.simple().to_string().to_uppercase()),
                _ => format!("'{}'", guid.hyphenated()),
            },
            LiteralValue::Date(date) => match self.dialect {
                Dialect::Oracle => format!("to_date('{}', 'yyyy-mm-dd')", date.format("%Y-%m-%d")),
                _ => format!("'{}'", date.format("%Y-%m-%d")),
            },
            LiteralValue::DateTime(dt) => match self.dialect {
                Dialect::SqlServer => format!("'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
                Dialect::Oracle => format!(
                    "to_date('{}', 'yyyy-mm-dd hh24:mi:ss')",
                    dt.format("%Y-%m-%d %H:%M:%S")
                ),
                _ => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
            },
            LiteralValue::DateTimeOffset(dt) => match self.dialect {
                Dialect::SqlServer => format!("'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f%:z")),
                Dialect::Oracle => format!(
                    "to_timestamp_tz('{}', 'YYYY-MM-DD HH24:MI:SS.FF6 TZH:TZM')",
                    dt.format("%Y-%m-%d %H:%M:%S%.6f %:z")
                ),
                _ => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f%:z")),
            },
            LiteralValue::Binary(bytes) => self.format_binary(bytes),
            LiteralValue::SystemMethod(method) => self.format_system_method(*method)?,
            LiteralValue::Function(sql) => sql.clone(),
        };

        Ok(rendered)
    }

    fn format_bool(&self, value: bool) -> &'static str {
        match (self.dialect, value) {
            (Dialect::Postgres, true) => "true",
            (Dialect::Postgres, false) => "false",
            (Dialect::Hana | Dialect::Snowflake, true) => "TRUE",
            (Dialect::Hana | Dialect::Snowflake, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    fn format_binary(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        match self.dialect {
            Dialect::SqlServer => format!("0x{}", hex),
            Dialect::Postgres => format!("'\\x{}'::bytea", hex),
            Dialect::Oracle => format!("HEXTORAW('{}')", hex),
            Dialect::Snowflake => format!("TO_BINARY('{}', 'HEX')", hex),
            Dialect::MySql | Dialect::Sqlite | Dialect::Hana => format!("X'{}'", hex),
        }
    }

    /// Dialect spelling of a system method
    pub fn format_system_method(&self, method: SystemMethod) -> Result<String> {
        use SystemMethod::*;

        let sql = match (self.dialect, method) {
            (Dialect::SqlServer, NewGuid) => "NEWID()",
            (Dialect::SqlServer, NewSequentialId) => "NEWSEQUENTIALID()",
            (Dialect::SqlServer, CurrentDateTime) => "GETDATE()",
            (Dialect::SqlServer, CurrentDateTimeOffset) => "SYSDATETIMEOFFSET()",
            (Dialect::SqlServer, CurrentUtcDateTime) => "GETUTCDATE()",
            (Dialect::SqlServer, CurrentUser) => "CURRENT_USER",

            (Dialect::Postgres, NewGuid | NewSequentialId) => "uuid_generate_v4()",
            (Dialect::Postgres, CurrentDateTime) => "now()",
            (Dialect::Postgres, CurrentUtcDateTime) => "(now() at time zone 'UTC')",
            (Dialect::Postgres, CurrentDateTimeOffset) => "current_timestamp",
            (Dialect::Postgres, CurrentUser) => "current_user",

            (Dialect::MySql, NewGuid) => "(SELECT UUID())",
            (Dialect::MySql, CurrentDateTime) => "CURRENT_TIMESTAMP",
            (Dialect::MySql, CurrentUtcDateTime) => "UTC_TIMESTAMP",
            (Dialect::MySql, CurrentUser) => "CURRENT_USER()",

            (Dialect::Oracle, NewGuid | NewSequentialId) => "sys_guid()",
            (Dialect::Oracle, CurrentDateTime) => "LOCALTIMESTAMP",
            (Dialect::Oracle, CurrentUtcDateTime) => "sys_extract_utc(SYSTIMESTAMP)",
            (Dialect::Oracle, CurrentDateTimeOffset) => "CURRENT_TIMESTAMP",
            (Dialect::Oracle, CurrentUser) => "USER",

            (Dialect::Sqlite, CurrentDateTime) => "(datetime('now','localtime'))",
            (Dialect::Sqlite, CurrentUtcDateTime) => "(datetime('now'))",

            (Dialect::Hana, NewGuid | NewSequentialId) => "SYSUUID",
            (Dialect::Hana, CurrentDateTime) => "CURRENT_TIMESTAMP",
            (Dialect::Hana, CurrentUtcDateTime) => "CURRENT_UTCTIMESTAMP",
            (Dialect::Hana, CurrentUser) => "CURRENT_USER",

            (Dialect::Snowflake, NewGuid) => "UUID_STRING()",
            (Dialect::Snowflake, CurrentDateTime | CurrentDateTimeOffset) => "CURRENT_TIMESTAMP",
            (Dialect::Snowflake, CurrentUtcDateTime) => "SYSDATE()",
            (Dialect::Snowflake, CurrentUser) => "CURRENT_USER",

            (dialect, method) => {
                return Err(Error::NotSupported(format!(
                    "{} has no equivalent of system method {}",
                    dialect, method
                )))
            }
        };

        Ok(sql.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, FixedOffset};
    use uuid::Uuid;

    fn quoter(dialect: Dialect) -> Quoter {
        match dialect {
            Dialect::SqlServer => Quoter::new(dialect, "[", "]").with_default_schema("dbo"),
            Dialect::MySql => Quoter::new(dialect, "`", "`"),
            Dialect::Oracle => Quoter::new(dialect, "\"", "\"").with_policy(QuotePolicy::Never),
            _ => Quoter::new(dialect, "\"", "\""),
        }
    }

    #[test]
    fn test_quote_and_unquote() {
        let q = quoter(Dialect::SqlServer);
        assert_eq!(q.quote_column_name("Name"), "[Name]");
        assert_eq!(q.quote_column_name("odd]name"), "[odd]]name]");
        assert_eq!(q.unquote("[odd]]name]"), "odd]name");
        assert_eq!(q.quote_column_name("[Name]"), "[Name]");

        for name in ["Users", "order details", "x1", "CamelCase"] {
            for dialect in Dialect::ALL {
                let q = quoter(dialect);
                assert_eq!(q.unquote(&q.quote_column_name(name)), name);
            }
        }
    }

    #[test]
    fn test_quote_table_name_uses_default_schema() {
        assert_eq!(quoter(Dialect::SqlServer).quote_table_name("T", None), "[dbo].[T]");
        assert_eq!(quoter(Dialect::SqlServer).quote_table_name("T", Some("audit")), "[audit].[T]");
        assert_eq!(quoter(Dialect::MySql).quote_table_name("T", None), "`T`");
        assert_eq!(quoter(Dialect::MySql).quote_table_name("T", Some("")), "`T`");
        assert_eq!(quoter(Dialect::Oracle).quote_table_name("T", Some("HR")), "HR.T");
    }

    #[test]
    fn test_quote_when_needed() {
        let q = Quoter::new(Dialect::Postgres, "\"", "\"").with_policy(QuotePolicy::WhenNeeded);
        assert_eq!(q.quote("users"), "users");
        assert_eq!(q.quote("Users"), "\"Users\"");
        assert_eq!(q.quote("order"), "\"order\"");
        assert_eq!(q.quote("first name"), "\"first name\"");
    }

    #[test]
    fn test_quote_strings() {
        assert_eq!(quoter(Dialect::Postgres).quote_string("it's"), "'it''s'");
        assert_eq!(quoter(Dialect::SqlServer).quote_string("it's"), "N'it''s'");
        assert_eq!(quoter(Dialect::MySql).quote_string("a\\b'c"), "'a\\\\b''c'");
    }

    #[test]
    fn test_quote_values() {
        let pg = quoter(Dialect::Postgres);
        assert_eq!(pg.quote_value(&LiteralValue::Null).unwrap(), "NULL");
        assert_eq!(pg.quote_value(&LiteralValue::Bool(true)).unwrap(), "true");
        assert_eq!(pg.quote_value(&LiteralValue::Int(-4)).unwrap(), "-4");
        assert_eq!(pg.quote_value(&LiteralValue::Char('x')).unwrap(), "'x'");
        assert_eq!(pg.quote_value(&LiteralValue::Enum("Active".into())).unwrap(), "'Active'");
        assert_eq!(pg.quote_value(&LiteralValue::Binary(vec![0xde, 0xad])).unwrap(), "'\\xDEAD'::bytea");
        assert_eq!(pg.quote_value(&LiteralValue::function("nextval('s')")).unwrap(), "nextval('s')");

        assert_eq!(quoter(Dialect::SqlServer).quote_value(&LiteralValue::Bool(true)).unwrap(), "1");
        assert_eq!(quoter(Dialect::Hana).quote_value(&LiteralValue::Bool(false)).unwrap(), "FALSE");
        assert_eq!(quoter(Dialect::SqlServer).quote_value(&LiteralValue::Binary(vec![1, 255])).unwrap(), "0x01FF");
        assert!(pg.quote_value(&LiteralValue::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_quote_dates_and_guids() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(14, 5, 0).unwrap();
        assert_eq!(
            quoter(Dialect::Postgres).quote_value(&LiteralValue::DateTime(dt)).unwrap(),
            "'2024-03-09 14:05:00'"
        );
        assert_eq!(
            quoter(Dialect::SqlServer).quote_value(&LiteralValue::DateTime(dt)).unwrap(),
            "'2024-03-09T14:05:00'"
        );
        assert_eq!(
            quoter(Dialect::Oracle).quote_value(&LiteralValue::DateTime(dt)).unwrap(),
            "to_date('2024-03-09 14:05:00', 'yyyy-mm-dd hh24:mi:ss')"
        );

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let dto = offset.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(
            quoter(Dialect::Postgres).quote_value(&LiteralValue::DateTimeOffset(dto)).unwrap(),
            "'2024-03-09 14:05:00+02:00'"
        );

        let guid = Uuid::parse_str("6f9619ff-8b86-d011-b42d-00c04fc964ff").unwrap();
        assert_eq!(
            quoter(Dialect::MySql).quote_value(&LiteralValue::Guid(guid)).unwrap(),
            "'6f9619ff-8b86-d011-b42d-00c04fc964ff'"
        );
        assert_eq!(
            quoter(Dialect::Oracle).quote_value(&LiteralValue::Guid(guid)).unwrap(),
            "HEXTORAW('6F9619FF8B86D011B42D00C04FC964FF')"
        );
    }

    #[test]
    fn test_system_methods() {
        assert_eq!(quoter(Dialect::Postgres).format_system_method(SystemMethod::CurrentDateTime).unwrap(), "now()");
        assert_eq!(quoter(Dialect::Oracle).format_system_method(SystemMethod::NewGuid).unwrap(), "sys_guid()");
        assert_eq!(quoter(Dialect::MySql).format_system_method(SystemMethod::CurrentDateTime).unwrap(), "CURRENT_TIMESTAMP");
        assert!(matches!(
            quoter(Dialect::Sqlite).format_system_method(SystemMethod::NewGuid),
            Err(Error::NotSupported(_))
        ));
    }
}

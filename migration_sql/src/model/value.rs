//! Literal values inlined into generated SQL
//!
//! Generated statements carry no bind parameters, so every value a migration
//! writes (column defaults, inserted rows, update predicates) is rendered as a
//! literal by the dialect's quoter. `LiteralValue` is the closed set of kinds
//! the quoter knows how to render.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database functions whose spelling differs per dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMethod {
    NewGuid,
    NewSequentialId,
    CurrentDateTime,
    CurrentDateTimeOffset,
    CurrentUtcDateTime,
    CurrentUser,
}

impl std::fmt::Display for SystemMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SystemMethod::NewGuid => "NewGuid",
            SystemMethod::NewSequentialId => "NewSequentialId",
            SystemMethod::CurrentDateTime => "CurrentDateTime",
            SystemMethod::CurrentDateTimeOffset => "CurrentDateTimeOffset",
            SystemMethod::CurrentUtcDateTime => "CurrentUTCDateTime",
            SystemMethod::CurrentUser => "CurrentUser",
        };
        f.write_str(name)
    }
}

/// A value rendered as a SQL literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LiteralValue {
    Null,
    String(String),
    Char(char),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Guid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Name of an enum member, stored as text
    Enum(String),
    Binary(Vec<u8>),
    SystemMethod(SystemMethod),
    /// Raw SQL expression emitted without quoting, e.g. `nextval('seq')`
    Function(String),
}

impl LiteralValue {
    /// Whether this is the SQL `NULL` literal
    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    /// Build a raw, unquoted SQL expression
    pub fn function(sql: impl Into<String>) -> Self {
        LiteralValue::Function(sql.into())
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::String(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::String(value)
    }
}

impl From<char> for LiteralValue {
    fn from(value: char) -> Self {
        LiteralValue::Char(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl From<i32> for LiteralValue {
    fn from(value: i32) -> Self {
        LiteralValue::Int(value.into())
    }
}

impl From<i64> for LiteralValue {
    fn from(value: i64) -> Self {
        LiteralValue::Int(value)
    }
}

impl From<u64> for LiteralValue {
    fn from(value: u64) -> Self {
        LiteralValue::UInt(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Float(value)
    }
}

impl From<Uuid> for LiteralValue {
    fn from(value: Uuid) -> Self {
        LiteralValue::Guid(value)
    }
}

impl From<NaiveDate> for LiteralValue {
    fn from(value: NaiveDate) -> Self {
        LiteralValue::Date(value)
    }
}

impl From<NaiveDateTime> for LiteralValue {
    fn from(value: NaiveDateTime) -> Self {
        LiteralValue::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for LiteralValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        LiteralValue::DateTimeOffset(value)
    }
}

impl From<SystemMethod> for LiteralValue {
    fn from(value: SystemMethod) -> Self {
        LiteralValue::SystemMethod(value)
    }
}

impl From<Vec<u8>> for LiteralValue {
    fn from(value: Vec<u8>) -> Self {
        LiteralValue::Binary(value)
    }
}

impl<T: Into<LiteralValue>> From<Option<T>> for LiteralValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(LiteralValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(LiteralValue::from(None::<i32>), LiteralValue::Null);
        assert_eq!(LiteralValue::from(Some("x")), LiteralValue::String("x".to_string()));
    }

    #[test]
    fn test_json_shape() {
        let value: LiteralValue =
            serde_json::from_str(r#"{"kind":"system_method","value":"current_date_time"}"#).unwrap();
        assert_eq!(value, LiteralValue::SystemMethod(SystemMethod::CurrentDateTime));

        let value: LiteralValue = serde_json::from_str(r#"{"kind":"null"}"#).unwrap();
        assert!(value.is_null());
    }
}

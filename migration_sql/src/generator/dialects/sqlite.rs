//! SQLite
//!
//! SQLite cannot alter columns or add constraints after the fact; foreign
//! keys are declared inside CREATE TABLE.

use crate::generator::dialect::{
    standard_clause_order, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::TypeMap;
use crate::model::types::DbType;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::Sqlite);
    for db_type in [
        DbType::Byte,
        DbType::SByte,
        DbType::Int16,
        DbType::Int32,
        DbType::Int64,
        DbType::UInt16,
        DbType::UInt32,
        DbType::UInt64,
        DbType::Boolean,
    ] {
        type_map.set(db_type, "INTEGER");
    }
    for db_type in [
        DbType::AnsiString,
        DbType::AnsiStringFixedLength,
        DbType::String,
        DbType::StringFixedLength,
        DbType::Xml,
    ] {
        type_map.set(db_type, "TEXT");
    }
    for db_type in [DbType::Date, DbType::DateTime, DbType::DateTime2, DbType::DateTimeOffset, DbType::Time] {
        type_map.set(db_type, "DATETIME");
    }
    type_map
        .set(DbType::Binary, "BLOB")
        .set(DbType::Currency, "NUMERIC")
        .set(DbType::Decimal, "NUMERIC")
        .set(DbType::Double, "REAL")
        .set(DbType::Single, "REAL")
        .set(DbType::Guid, "UNIQUEIDENTIFIER");

    let quoter = Quoter::new(Dialect::Sqlite, "\"", "\"")
        .with_policy(quote_policy(options, QuotePolicy::Always));

    DialectProfile {
        dialect: Dialect::Sqlite,
        type_map,
        quoter,
        column_clause_order: standard_clause_order(),
        templates: Templates {
            create_schema: None,
            drop_schema: None,
            alter_column: None,
            add_foreign_key: None,
            drop_foreign_key: None,
            add_constraint: None,
            drop_constraint: None,
            set_default: None,
            drop_default: None,
            create_sequence: None,
            drop_sequence: None,
            create_routine: None,
            drop_function: None,
            drop_procedure: None,
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 128,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_are_ignored() {
        let profile = profile(&DialectOptions::default());
        assert_eq!(profile.type_map.get(DbType::String, Some(50), None).unwrap(), "TEXT");
        assert_eq!(profile.type_map.get(DbType::Int64, None, None).unwrap(), "INTEGER");
    }
}

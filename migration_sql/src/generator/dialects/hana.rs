//! SAP HANA

use crate::generator::dialect::{
    ColumnClause, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::{TypeMap, MAX_CAPACITY};
use crate::model::types::DbType;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::Hana);
    type_map
        .set(DbType::AnsiStringFixedLength, "VARCHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 5000, "VARCHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 5000, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, MAX_CAPACITY, "CLOB")
        .set(DbType::StringFixedLength, "NVARCHAR(255)")
        .set_sized(DbType::StringFixedLength, 5000, "NVARCHAR($size)")
        .set(DbType::String, "NVARCHAR(255)")
        .set_sized(DbType::String, 5000, "NVARCHAR($size)")
        .set_sized(DbType::String, MAX_CAPACITY, "NCLOB")
        .set(DbType::Binary, "VARBINARY(5000)")
        .set_sized(DbType::Binary, 5000, "VARBINARY($size)")
        .set_sized(DbType::Binary, MAX_CAPACITY, "BLOB")
        .set(DbType::Boolean, "BOOLEAN")
        .set(DbType::Byte, "TINYINT")
        .set(DbType::Currency, "DECIMAL(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP")
        .set(DbType::DateTime2, "TIMESTAMP")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 38, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE")
        .set(DbType::Guid, "VARCHAR(36)")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "NCLOB");

    let quoter = Quoter::new(Dialect::Hana, "\"", "\"")
        .with_policy(quote_policy(options, QuotePolicy::Always));

    DialectProfile {
        dialect: Dialect::Hana,
        type_map,
        quoter,
        column_clause_order: vec![
            ColumnClause::Name,
            ColumnClause::Type,
            ColumnClause::Default,
            ColumnClause::Identity,
            ColumnClause::Nullable,
            ColumnClause::PrimaryKey,
        ],
        templates: Templates {
            create_table: "CREATE COLUMN TABLE {table} ({columns})",
            drop_table_if_exists: None,
            rename_table: Some("RENAME TABLE {table} TO {new_name}"),
            add_column: Some("ALTER TABLE {table} ADD ({column})"),
            alter_column: Some("ALTER TABLE {table} ALTER ({column})"),
            drop_column: Some("ALTER TABLE {table} DROP ({column})"),
            rename_column: Some("RENAME COLUMN {table}.{old_name} TO {new_name}"),
            set_default: None,
            drop_default: None,
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 127,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_before_nullable() {
        let profile = profile(&DialectOptions::default());
        let default_at = profile.column_clause_order.iter().position(|c| *c == ColumnClause::Default);
        let nullable_at = profile.column_clause_order.iter().position(|c| *c == ColumnClause::Nullable);
        assert!(default_at < nullable_at);
    }
}

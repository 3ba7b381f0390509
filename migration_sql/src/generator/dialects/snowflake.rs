//! Snowflake
//!
//! Snowflake has no indexes and only partial sequence options. The
//! `QuoteIdentifiers` switch turns identifier quoting off.

use crate::error::Result;
use crate::generator::column::ColumnGenerator;
use crate::generator::dialect::{
    ColumnClause, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::TypeMap;
use crate::model::expressions::AlterColumnExpression;
use crate::model::types::DbType;

const MAX_VARCHAR: u32 = 16_777_216;
const MAX_BINARY: u32 = 8_388_608;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::Snowflake);
    type_map
        .set(DbType::AnsiStringFixedLength, "CHAR")
        .set_sized(DbType::AnsiStringFixedLength, MAX_VARCHAR, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR")
        .set_sized(DbType::AnsiString, MAX_VARCHAR, "VARCHAR($size)")
        .set(DbType::StringFixedLength, "CHAR")
        .set_sized(DbType::StringFixedLength, MAX_VARCHAR, "CHAR($size)")
        .set(DbType::String, "VARCHAR")
        .set_sized(DbType::String, MAX_VARCHAR, "VARCHAR($size)")
        .set(DbType::Binary, "BINARY")
        .set_sized(DbType::Binary, MAX_BINARY, "BINARY($size)")
        .set(DbType::Boolean, "BOOLEAN")
        .set(DbType::Byte, "NUMBER(3,0)")
        .set(DbType::Currency, "NUMBER(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP_NTZ")
        .set(DbType::DateTime2, "TIMESTAMP_NTZ")
        .set(DbType::DateTimeOffset, "TIMESTAMP_TZ")
        .set(DbType::Decimal, "NUMBER(19,5)")
        .set_sized(DbType::Decimal, 38, "NUMBER($size,$precision)")
        .set(DbType::Double, "DOUBLE")
        .set(DbType::Guid, "VARCHAR(36)")
        .set(DbType::Int16, "NUMBER(5,0)")
        .set(DbType::Int32, "NUMBER(10,0)")
        .set(DbType::Int64, "NUMBER(19,0)")
        .set(DbType::Single, "FLOAT")
        .set(DbType::Time, "TIME");

    let quoter = Quoter::new(Dialect::Snowflake, "\"", "\"")
        .with_policy(quote_policy(options, QuotePolicy::Always))
        .with_default_schema("PUBLIC");

    DialectProfile {
        dialect: Dialect::Snowflake,
        type_map,
        quoter,
        column_clause_order: vec![
            ColumnClause::Name,
            ColumnClause::Type,
            ColumnClause::Collation,
            ColumnClause::Default,
            ColumnClause::Identity,
            ColumnClause::Nullable,
            ColumnClause::PrimaryKey,
        ],
        templates: Templates {
            alter_schema: Some("ALTER TABLE {table} RENAME TO {destination}.{name}"),
            rename_table: Some("ALTER TABLE {table} RENAME TO {new_table}"),
            create_index: None,
            drop_index: None,
            set_default: None,
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 255,
    }
}

/// Type and nullability changes; defaults cannot be altered
pub fn alter_column(profile: &DialectProfile, expression: &AlterColumnExpression) -> Result<String> {
    let quoter = &profile.quoter;
    let column = &expression.column;
    let name = quoter.quote_column_name(&column.name);

    if column.default_value.is_some() {
        profile.unsupported(format!(
            "changing the default of column '{}' on table '{}'",
            column.name, expression.table_name
        ))?;
    }

    let nullability = match column.nullable {
        Some(true) => "DROP NOT NULL",
        _ => "SET NOT NULL",
    };

    Ok(format!(
        "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}, COLUMN {} {}",
        quoter.quote_table_name(&expression.table_name, expression.schema_name.as_deref()),
        name,
        ColumnGenerator::new(profile).native_type(column)?,
        name,
        nullability
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ColumnDefinition;

    #[test]
    fn test_quote_identifiers_switch() {
        let profile = profile(&DialectOptions::from_switches("QuoteIdentifiers=false").unwrap());
        assert_eq!(profile.quoter.quote_table_name("ORDERS", None), "PUBLIC.ORDERS");
    }

    #[test]
    fn test_alter_column() {
        let profile = profile(&DialectOptions::default());
        let expression = AlterColumnExpression {
            schema_name: None,
            table_name: "T".into(),
            column: ColumnDefinition::new("C", DbType::String).size(20).nullable(true),
        };

        assert_eq!(
            alter_column(&profile, &expression).unwrap(),
            "ALTER TABLE \"PUBLIC\".\"T\" ALTER COLUMN \"C\" SET DATA TYPE VARCHAR(20), COLUMN \"C\" DROP NOT NULL"
        );
    }
}

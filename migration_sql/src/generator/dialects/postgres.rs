//! PostgreSQL

use crate::error::Result;
use crate::generator::column::ColumnGenerator;
use crate::generator::dialect::{
    standard_clause_order, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::TypeMap;
use crate::model::expressions::AlterColumnExpression;
use crate::model::types::DbType;

const MAX_VARCHAR: u32 = 10_485_760;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::Postgres);
    type_map
        .set(DbType::AnsiStringFixedLength, "char(255)")
        .set_sized(DbType::AnsiStringFixedLength, MAX_VARCHAR, "char($size)")
        .set(DbType::AnsiString, "text")
        .set_sized(DbType::AnsiString, MAX_VARCHAR, "varchar($size)")
        .set(DbType::StringFixedLength, "char(255)")
        .set_sized(DbType::StringFixedLength, MAX_VARCHAR, "char($size)")
        .set(DbType::String, "text")
        .set_sized(DbType::String, MAX_VARCHAR, "varchar($size)")
        .set(DbType::Binary, "bytea")
        .set(DbType::Boolean, "boolean")
        .set(DbType::Byte, "smallint")
        .set(DbType::Currency, "money")
        .set(DbType::Date, "date")
        .set(DbType::DateTime, "timestamp")
        .set(DbType::DateTime2, "timestamp")
        .set(DbType::DateTimeOffset, "timestamptz")
        .set(DbType::Decimal, "decimal(19,5)")
        .set_sized(DbType::Decimal, 1000, "decimal($size,$precision)")
        .set(DbType::Double, "float8")
        .set(DbType::Guid, "uuid")
        .set(DbType::Int16, "smallint")
        .set(DbType::Int32, "integer")
        .set(DbType::Int64, "bigint")
        .set(DbType::Single, "float4")
        .set(DbType::Time, "time")
        .set(DbType::Xml, "xml");

    let default_policy = match options.force_quote {
        Some(false) => QuotePolicy::WhenNeeded,
        _ => QuotePolicy::Always,
    };
    let quoter = Quoter::new(Dialect::Postgres, "\"", "\"")
        .with_policy(quote_policy(options, default_policy))
        .with_default_schema("public");

    DialectProfile {
        dialect: Dialect::Postgres,
        type_map,
        quoter,
        column_clause_order: standard_clause_order(),
        templates: Templates {
            alter_schema: Some("ALTER TABLE {table} SET SCHEMA {destination}"),
            add_column: Some("ALTER TABLE {table} ADD {column}"),
            drop_index: Some("DROP INDEX {qualified_name}"),
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 63,
    }
}

/// One ALTER TABLE with a sub-clause per changed aspect
pub fn alter_column(profile: &DialectProfile, expression: &AlterColumnExpression) -> Result<String> {
    let quoter = &profile.quoter;
    let column = &expression.column;
    let name = quoter.quote_column_name(&column.name);

    let mut data_type = ColumnGenerator::new(profile).native_type(column)?;
    if let Some(collation) = &column.collation {
        data_type = format!("{} COLLATE {}", data_type, quoter.quote(collation));
    }

    let mut clauses = vec![format!("ALTER {} TYPE {}", name, data_type)];

    match column.nullable {
        Some(true) => clauses.push(format!("ALTER {} DROP NOT NULL", name)),
        _ => clauses.push(format!("ALTER {} SET NOT NULL", name)),
    }

    if let Some(value) = &column.default_value {
        clauses.push(format!("ALTER {} SET DEFAULT {}", name, quoter.quote_value(value)?));
    }

    Ok(format!(
        "ALTER TABLE {} {}",
        quoter.quote_table_name(&expression.table_name, expression.schema_name.as_deref()),
        clauses.join(", ")
    ))
}

//! SQL Server
//!
//! Defaults are named constraints, so changing or dropping a column first
//! has to find and drop whatever default is bound to it.

use crate::error::Result;
use crate::generator::column::ColumnGenerator;
use crate::generator::dialect::{
    ColumnClause, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::{TypeMap, MAX_CAPACITY};
use crate::model::expressions::{
    AlterColumnExpression, AlterDefaultConstraintExpression, DeleteColumnExpression,
};
use crate::model::types::DbType;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::SqlServer);
    type_map
        .set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 8000, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 8000, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, MAX_CAPACITY, "VARCHAR(MAX)")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 4000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR(255)")
        .set_sized(DbType::String, 4000, "NVARCHAR($size)")
        .set_sized(DbType::String, MAX_CAPACITY, "NVARCHAR(MAX)")
        .set(DbType::Binary, "VARBINARY(8000)")
        .set_sized(DbType::Binary, 8000, "VARBINARY($size)")
        .set_sized(DbType::Binary, MAX_CAPACITY, "VARBINARY(MAX)")
        .set(DbType::Boolean, "BIT")
        .set(DbType::Byte, "TINYINT")
        .set(DbType::Currency, "MONEY")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME2")
        .set(DbType::DateTimeOffset, "DATETIMEOFFSET")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 38, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "UNIQUEIDENTIFIER")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INT")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::Single, "REAL")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "XML");

    let quoter = Quoter::new(Dialect::SqlServer, "[", "]")
        .with_policy(quote_policy(options, QuotePolicy::Always))
        .with_default_schema("dbo");

    DialectProfile {
        dialect: Dialect::SqlServer,
        type_map,
        quoter,
        column_clause_order: vec![
            ColumnClause::Name,
            ColumnClause::Type,
            ColumnClause::Collation,
            ColumnClause::Nullable,
            ColumnClause::Default,
            ColumnClause::Identity,
            ColumnClause::PrimaryKey,
        ],
        templates: Templates {
            alter_schema: Some("ALTER SCHEMA {destination} TRANSFER {table}"),
            rename_table: Some("EXEC sp_rename {table_literal}, {new_name_literal}"),
            add_column: Some("ALTER TABLE {table} ADD {column}"),
            rename_column: Some("EXEC sp_rename {column_literal}, {new_name_literal}, N'COLUMN'"),
            drop_index: Some("DROP INDEX {name} ON {table}"),
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 128,
    }
}

/// Script dropping the default constraints bound to `columns`.
///
/// Variables are declared once so the script stays valid for several columns.
pub fn drop_default_script(profile: &DialectProfile, table: &str, schema: Option<&str>, columns: &[&str]) -> String {
    let quoter = &profile.quoter;
    let qualified = quoter.quote_table_name(table, schema);
    let table_literal = quoter.quote_string(&qualified);
    let drop_prefix = quoter.quote_string(&format!("ALTER TABLE {} DROP CONSTRAINT ", qualified));

    let mut script = String::from("DECLARE @default sysname, @sql nvarchar(max);\n");

    for column in columns {
        script.push_str(&format!(
            "\n-- drop the default bound to {column}\n\
             SET @default = NULL;\n\
             SELECT @default = name\n\
             FROM sys.default_constraints\n\
             WHERE parent_object_id = object_id({table})\n\
             AND type = 'D'\n\
             AND parent_column_id = (\n\
             SELECT column_id\n\
             FROM sys.columns\n\
             WHERE object_id = object_id({table})\n\
             AND name = {column_literal}\n\
             );\n\
             SET @sql = {drop_prefix} + QUOTENAME(@default);\n\
             EXEC sp_executesql @sql;\n",
            column = column,
            table = table_literal,
            column_literal = quoter.quote_string(column),
            drop_prefix = drop_prefix,
        ));
    }

    script.trim_end().to_string()
}

/// Columns are dropped after their default constraints
pub fn delete_columns(profile: &DialectProfile, expression: &DeleteColumnExpression) -> Vec<String> {
    let schema = expression.schema_name.as_deref();
    let table = profile.quoter.quote_table_name(&expression.table_name, schema);
    let columns: Vec<&str> = expression.column_names.iter().map(String::as_str).collect();

    let mut statements = vec![drop_default_script(profile, &expression.table_name, schema, &columns)];
    for column in &columns {
        statements.push(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            table,
            profile.quoter.quote_column_name(column)
        ));
    }
    statements
}

/// ALTER COLUMN cannot carry a default, so a new default is rebound separately
pub fn alter_column(profile: &DialectProfile, expression: &AlterColumnExpression) -> Result<Vec<String>> {
    let schema = expression.schema_name.as_deref();
    let table = profile.quoter.quote_table_name(&expression.table_name, schema);
    let columns = ColumnGenerator::new(profile);

    let mut column = expression.column.clone();
    let default_value = column.default_value.take();
    if column.is_identity {
        profile.unsupported(format!(
            "adding IDENTITY to existing column '{}' on table '{}'",
            column.name, expression.table_name
        ))?;
        column.is_identity = false;
    }

    let mut statements = Vec::new();
    if default_value.is_some() {
        statements.push(drop_default_script(profile, &expression.table_name, schema, &[column.name.as_str()]));
    }

    statements.push(format!(
        "ALTER TABLE {} ALTER COLUMN {}",
        table,
        columns.generate_for_alter(&column, &expression.table_name)?
    ));

    if let Some(value) = default_value {
        statements.extend(alter_default_constraint(
            profile,
            &AlterDefaultConstraintExpression {
                schema_name: expression.schema_name.clone(),
                table_name: expression.table_name.clone(),
                column_name: column.name.clone(),
                default_value: value,
            },
            false,
        )?);
    }

    Ok(statements)
}

/// Rebind a column default; `drop_existing` removes the current one first
pub fn alter_default_constraint(
    profile: &DialectProfile,
    expression: &AlterDefaultConstraintExpression,
    drop_existing: bool,
) -> Result<Vec<String>> {
    let quoter = &profile.quoter;
    let schema = expression.schema_name.as_deref();
    let name = ColumnGenerator::new(profile).default_constraint_name(&expression.table_name, &expression.column_name);

    let mut statements = Vec::new();
    if drop_existing {
        statements.push(drop_default_script(
            profile,
            &expression.table_name,
            schema,
            &[expression.column_name.as_str()],
        ));
    }

    statements.push(format!(
        "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
        quoter.quote_table_name(&expression.table_name, schema),
        quoter.quote_constraint_name(&name),
        quoter.quote_value(&expression.default_value)?,
        quoter.quote_column_name(&expression.column_name)
    ));

    Ok(statements)
}

/// Wrap inserts into an identity column
pub fn with_identity_insert(table: &str, statements: Vec<String>) -> Vec<String> {
    let mut wrapped = Vec::with_capacity(statements.len() + 2);
    wrapped.push(format!("SET IDENTITY_INSERT {} ON", table));
    wrapped.extend(statements);
    wrapped.push(format!("SET IDENTITY_INSERT {} OFF", table));
    wrapped
}

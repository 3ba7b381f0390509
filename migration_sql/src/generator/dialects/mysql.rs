//! MySQL
//!
//! Tables are created with the InnoDB engine; column comments are inline.

use crate::generator::dialect::{
    standard_clause_order, ColumnClause, CompatibilityMode, Dialect, DialectOptions,
    DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::{TypeMap, MAX_CAPACITY};
use crate::model::expressions::DeleteConstraintExpression;
use crate::model::types::{ConstraintType, DbType};
use crate::utils::naming::{get_unique_constraint_name, truncate_identifier};

const TEXT_CAPACITY: u32 = 65_535;
const MEDIUMTEXT_CAPACITY: u32 = 16_777_215;

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::MySql);
    type_map
        .set(DbType::AnsiStringFixedLength, "CHAR(255)")
        .set_sized(DbType::AnsiStringFixedLength, 255, "CHAR($size)")
        .set(DbType::AnsiString, "VARCHAR(255)")
        .set_sized(DbType::AnsiString, 255, "VARCHAR($size)")
        .set_sized(DbType::AnsiString, TEXT_CAPACITY, "TEXT")
        .set_sized(DbType::AnsiString, MEDIUMTEXT_CAPACITY, "MEDIUMTEXT")
        .set_sized(DbType::AnsiString, MAX_CAPACITY, "LONGTEXT")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 255, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR(255)")
        .set_sized(DbType::String, 255, "NVARCHAR($size)")
        .set_sized(DbType::String, TEXT_CAPACITY, "TEXT")
        .set_sized(DbType::String, MEDIUMTEXT_CAPACITY, "MEDIUMTEXT")
        .set_sized(DbType::String, MAX_CAPACITY, "LONGTEXT")
        .set(DbType::Binary, "LONGBLOB")
        .set_sized(DbType::Binary, 255, "TINYBLOB")
        .set_sized(DbType::Binary, TEXT_CAPACITY, "BLOB")
        .set_sized(DbType::Binary, MEDIUMTEXT_CAPACITY, "MEDIUMBLOB")
        .set_sized(DbType::Binary, MAX_CAPACITY, "LONGBLOB")
        .set(DbType::Boolean, "TINYINT(1)")
        .set(DbType::Byte, "TINYINT UNSIGNED")
        .set(DbType::SByte, "TINYINT")
        .set(DbType::Currency, "DECIMAL(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "DATETIME")
        .set(DbType::DateTime2, "DATETIME")
        .set(DbType::DateTimeOffset, "TIMESTAMP")
        .set(DbType::Decimal, "DECIMAL(19,5)")
        .set_sized(DbType::Decimal, 65, "DECIMAL($size,$precision)")
        .set(DbType::Double, "DOUBLE")
        .set(DbType::Guid, "CHAR(36)")
        .set(DbType::Int16, "SMALLINT")
        .set(DbType::Int32, "INTEGER")
        .set(DbType::Int64, "BIGINT")
        .set(DbType::UInt16, "SMALLINT UNSIGNED")
        .set(DbType::UInt32, "INTEGER UNSIGNED")
        .set(DbType::UInt64, "BIGINT UNSIGNED")
        .set(DbType::Single, "FLOAT")
        .set(DbType::Time, "TIME")
        .set(DbType::Xml, "LONGTEXT");

    let quoter = Quoter::new(Dialect::MySql, "`", "`")
        .with_policy(quote_policy(options, QuotePolicy::Always));

    let mut column_clause_order = standard_clause_order();
    column_clause_order.push(ColumnClause::Description);

    DialectProfile {
        dialect: Dialect::MySql,
        type_map,
        quoter,
        column_clause_order,
        templates: Templates {
            create_schema: None,
            drop_schema: None,
            create_table: "CREATE TABLE {table} ({columns}) ENGINE = INNODB",
            rename_table: Some("RENAME TABLE {table} TO {new_table}"),
            alter_column: Some("ALTER TABLE {table} MODIFY COLUMN {column}"),
            drop_foreign_key: Some("ALTER TABLE {table} DROP FOREIGN KEY {name}"),
            drop_index: Some("DROP INDEX {name} ON {table}"),
            set_default: Some("ALTER TABLE {table} ALTER {column} SET DEFAULT {value}"),
            drop_default: Some("ALTER TABLE {table} ALTER {column} DROP DEFAULT"),
            create_sequence: None,
            drop_sequence: None,
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 64,
    }
}

/// Primary keys and unique keys are dropped as keys, not constraints
pub fn delete_constraint(profile: &DialectProfile, expression: &DeleteConstraintExpression) -> String {
    let constraint = &expression.constraint;
    let quoter = &profile.quoter;
    let table = quoter.quote_table_name(&constraint.table_name, constraint.schema_name.as_deref());

    match constraint.constraint_type {
        ConstraintType::PrimaryKey => format!("ALTER TABLE {} DROP PRIMARY KEY", table),
        ConstraintType::Unique => {
            let name = constraint.name.clone().unwrap_or_else(|| {
                let columns: Vec<&str> = constraint.columns.iter().map(String::as_str).collect();
                truncate_identifier(
                    &get_unique_constraint_name(&constraint.table_name, &columns),
                    profile.max_identifier_length,
                )
            });
            format!("ALTER TABLE {} DROP INDEX {}", table, quoter.quote_index_name(&name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::ConstraintDefinition;

    #[test]
    fn test_delete_constraint() {
        let profile = profile(&DialectOptions::default());

        let pk = DeleteConstraintExpression {
            constraint: ConstraintDefinition::new(ConstraintType::PrimaryKey, "T", &["Id"]),
        };
        assert_eq!(delete_constraint(&profile, &pk), "ALTER TABLE `T` DROP PRIMARY KEY");

        let unique = DeleteConstraintExpression {
            constraint: ConstraintDefinition::new(ConstraintType::Unique, "T", &["Email"]),
        };
        assert_eq!(delete_constraint(&profile, &unique), "ALTER TABLE `T` DROP INDEX `UC_T_Email`");
    }
}

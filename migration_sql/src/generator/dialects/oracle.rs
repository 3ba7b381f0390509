//! Oracle (12c and later)
//!
//! Identifiers are left unquoted unless `QuoteIdentifiers=true`. Several
//! statements generated for one expression are run through a single
//! anonymous block.

use crate::error::Result;
use crate::generator::dialect::{
    ColumnClause, CompatibilityMode, Dialect, DialectOptions, DialectProfile, Templates,
};
use crate::generator::dialects::quote_policy;
use crate::generator::quoter::{QuotePolicy, Quoter};
use crate::generator::type_map::{TypeMap, MAX_CAPACITY};
use crate::model::expressions::DataRow;
use crate::model::types::DbType;

const DROP_TABLE_IF_EXISTS: &str = "BEGIN
  EXECUTE IMMEDIATE {drop_literal};
EXCEPTION
  WHEN OTHERS THEN
    IF SQLCODE != -942 THEN
      RAISE;
    END IF;
END;";

pub fn profile(options: &DialectOptions) -> DialectProfile {
    let mut type_map = TypeMap::new(Dialect::Oracle);
    type_map
        .set(DbType::AnsiStringFixedLength, "CHAR(255 CHAR)")
        .set_sized(DbType::AnsiStringFixedLength, 2000, "CHAR($size CHAR)")
        .set(DbType::AnsiString, "VARCHAR2(255 CHAR)")
        .set_sized(DbType::AnsiString, 4000, "VARCHAR2($size CHAR)")
        .set_sized(DbType::AnsiString, MAX_CAPACITY, "CLOB")
        .set(DbType::StringFixedLength, "NCHAR(255)")
        .set_sized(DbType::StringFixedLength, 2000, "NCHAR($size)")
        .set(DbType::String, "NVARCHAR2(255)")
        .set_sized(DbType::String, 4000, "NVARCHAR2($size)")
        .set_sized(DbType::String, MAX_CAPACITY, "NCLOB")
        .set(DbType::Binary, "RAW(2000)")
        .set_sized(DbType::Binary, 2000, "RAW($size)")
        .set_sized(DbType::Binary, MAX_CAPACITY, "BLOB")
        .set(DbType::Boolean, "NUMBER(1,0)")
        .set(DbType::Byte, "NUMBER(3,0)")
        .set(DbType::Currency, "NUMBER(19,4)")
        .set(DbType::Date, "DATE")
        .set(DbType::DateTime, "TIMESTAMP(4)")
        .set(DbType::DateTime2, "TIMESTAMP(7)")
        .set(DbType::DateTimeOffset, "TIMESTAMP(4) WITH TIME ZONE")
        .set(DbType::Decimal, "NUMBER(19,5)")
        .set_sized(DbType::Decimal, 38, "NUMBER($size,$precision)")
        .set(DbType::Double, "DOUBLE PRECISION")
        .set(DbType::Guid, "RAW(16)")
        .set(DbType::Int16, "NUMBER(5,0)")
        .set(DbType::Int32, "NUMBER(10,0)")
        .set(DbType::Int64, "NUMBER(19,0)")
        .set(DbType::Single, "FLOAT(24)")
        .set(DbType::Time, "DATE")
        .set(DbType::Xml, "XMLTYPE");

    let quoter = Quoter::new(Dialect::Oracle, "\"", "\"")
        .with_policy(quote_policy(options, QuotePolicy::Never));

    DialectProfile {
        dialect: Dialect::Oracle,
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
            // Oracle schemas are users
            create_schema: None,
            drop_schema: None,
            drop_table_if_exists: Some(DROP_TABLE_IF_EXISTS),
            add_column: Some("ALTER TABLE {table} ADD {column}"),
            alter_column: Some("ALTER TABLE {table} MODIFY {column}"),
            drop_index: Some("DROP INDEX {qualified_name}"),
            set_default: Some("ALTER TABLE {table} MODIFY {column} DEFAULT {value}"),
            drop_default: Some("ALTER TABLE {table} MODIFY {column} DEFAULT NULL"),
            ..Templates::generic()
        },
        compatibility_mode: CompatibilityMode::Strict,
        max_identifier_length: 30,
    }
}

/// `INSERT ALL` inserting every row in one statement
pub fn insert_all(profile: &DialectProfile, table: &str, rows: &[DataRow]) -> Result<String> {
    let quoter = &profile.quoter;
    let mut sql = String::from("INSERT ALL");

    for row in rows {
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let values = row
            .values()
            .map(|v| quoter.quote_value(v))
            .collect::<Result<Vec<_>>>()?;

        sql.push_str(&format!(
            "\n  INTO {} ({}) VALUES ({})",
            table,
            quoter.quote_column_list(&columns),
            values.join(", ")
        ));
    }

    sql.push_str("\nSELECT 1 FROM DUAL");
    Ok(sql)
}

/// Run several statements as one anonymous block.
///
/// Plain statements go through `EXECUTE IMMEDIATE`; statements that are
/// already PL/SQL blocks are nested as they are.
pub fn wrap_in_block(statements: &[String]) -> String {
    let mut block = String::from("BEGIN");

    for statement in statements {
        let trimmed = statement.trim();
        let upper = trimmed.to_uppercase();

        if upper.starts_with("BEGIN") || upper.starts_with("DECLARE") {
            block.push('\n');
            block.push_str(trimmed);
        } else {
            let body = trimmed.trim_end_matches(';');
            block.push_str(&format!("\nEXECUTE IMMEDIATE '{}';", body.replace('\'', "''")));
        }
    }

    block.push_str("\nEND;");
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::LiteralValue;

    #[test]
    fn test_identifiers_unquoted_by_default() {
        let profile = profile(&DialectOptions::default());
        assert_eq!(profile.quoter.quote_table_name("Users", Some("HR")), "HR.Users");

        let quoted = super::profile(&DialectOptions::from_switches("QuoteIdentifiers=true").unwrap());
        assert_eq!(quoted.quoter.quote_table_name("Users", None), "\"Users\"");
    }

    #[test]
    fn test_insert_all() {
        let profile = profile(&DialectOptions::default());
        let mut first = DataRow::new();
        first.insert("ID".into(), LiteralValue::Int(1));
        first.insert("NAME".into(), LiteralValue::from("a"));
        let mut second = DataRow::new();
        second.insert("ID".into(), LiteralValue::Int(2));
        second.insert("NAME".into(), LiteralValue::Null);

        assert_eq!(
            insert_all(&profile, "T", &[first, second]).unwrap(),
            "INSERT ALL\n  INTO T (ID, NAME) VALUES (1, 'a')\n  INTO T (ID, NAME) VALUES (2, NULL)\nSELECT 1 FROM DUAL"
        );
    }

    #[test]
    fn test_wrap_in_block() {
        let block = wrap_in_block(&[
            "CREATE TABLE T (A NUMBER(10,0) NOT NULL)".to_string(),
            "COMMENT ON TABLE T IS 'it''s'".to_string(),
        ]);

        assert_eq!(
            block,
            "BEGIN\nEXECUTE IMMEDIATE 'CREATE TABLE T (A NUMBER(10,0) NOT NULL)';\n\
             EXECUTE IMMEDIATE 'COMMENT ON TABLE T IS ''it''''s''';\nEND;"
        );
    }
}

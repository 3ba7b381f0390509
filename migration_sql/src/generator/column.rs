//! Column clause generation
//!
//! A column definition is rendered by running the profile's clause order,
//! one formatter per `ColumnClause`, and joining the non-empty fragments.

use crate::error::Result;
use crate::generator::dialect::{ColumnClause, Dialect, DialectProfile};
use crate::model::types::{ColumnDefinition, DbType, ForeignKeyDefinition};
use crate::utils::naming::{get_default_constraint_name, get_foreign_key_name, truncate_identifier};

pub struct ColumnGenerator<'a> {
    profile: &'a DialectProfile,
}

impl<'a> ColumnGenerator<'a> {
    pub fn new(profile: &'a DialectProfile) -> Self {
        Self { profile }
    }

    /// Render one column, with an inline primary key marker when it is one
    pub fn generate(&self, column: &ColumnDefinition, table_name: &str) -> Result<String> {
        self.render(column, table_name, true)
    }

    /// Render one column for ALTER statements, without key markers
    pub fn generate_for_alter(&self, column: &ColumnDefinition, table_name: &str) -> Result<String> {
        self.render(column, table_name, false)
    }

    /// Render a table's column list, hoisting the primary key when needed
    pub fn generate_all(&self, columns: &[ColumnDefinition], table_name: &str) -> Result<String> {
        let hoist = self.should_hoist_primary_key(columns);

        let mut clauses = columns
            .iter()
            .map(|column| self.render(column, table_name, !hoist))
            .collect::<Result<Vec<_>>>()?;

        if hoist {
            clauses.push(self.primary_key_clause(columns));
        }

        Ok(clauses.join(", "))
    }

    /// More than one key column, or a named key, forces a table-level clause
    pub fn should_hoist_primary_key(&self, columns: &[ColumnDefinition]) -> bool {
        let keys: Vec<_> = columns.iter().filter(|c| c.is_primary_key).collect();

        // SQLite only accepts AUTOINCREMENT on an inline single column key
        if self.profile.dialect == Dialect::Sqlite && keys.len() == 1 && keys[0].is_identity {
            return false;
        }

        keys.len() > 1 || keys.iter().any(|c| c.primary_key_name.is_some())
    }

    fn primary_key_clause(&self, columns: &[ColumnDefinition]) -> String {
        let quoter = &self.profile.quoter;
        let keys: Vec<&str> = columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect();
        let name = columns.iter().find_map(|c| c.primary_key_name.as_deref());

        match name {
            Some(name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                quoter.quote_constraint_name(name),
                quoter.quote_column_list(&keys)
            ),
            None => format!("PRIMARY KEY ({})", quoter.quote_column_list(&keys)),
        }
    }

    fn render(&self, column: &ColumnDefinition, table_name: &str, inline_key: bool) -> Result<String> {
        if self.profile.dialect == Dialect::Sqlite
            && column.is_identity
            && !(inline_key && column.is_primary_key)
        {
            self.profile.unsupported(format!(
                "AUTOINCREMENT on column '{}' of table '{}' unless it is the only primary key column",
                column.name, table_name
            ))?;
        }

        let mut parts = Vec::with_capacity(self.profile.column_clause_order.len());

        for clause in &self.profile.column_clause_order {
            let part = match clause {
                ColumnClause::Name => self.profile.quoter.quote_column_name(&column.name),
                ColumnClause::Type => self.format_type(column)?,
                ColumnClause::Collation => self.format_collation(column),
                ColumnClause::Nullable => self.format_nullable(column),
                ColumnClause::Default => self.format_default(column, table_name)?,
                ColumnClause::PrimaryKey => self.format_primary_key(column, inline_key),
                ColumnClause::Identity => self.format_identity(column),
                ColumnClause::Description => self.format_description(column),
            };

            if !part.is_empty() {
                parts.push(part);
            }
        }

        Ok(parts.join(" "))
    }

    /// Native type of the column; custom types win over the type map
    pub fn native_type(&self, column: &ColumnDefinition) -> Result<String> {
        if let Some(custom) = &column.custom_type {
            return Ok(custom.clone());
        }

        let db_type = column.db_type.unwrap_or(DbType::String);
        self.profile.type_map.get(db_type, column.size, column.precision)
    }

    /// Type as written in a column definition, with identity substitutions
    pub fn format_type(&self, column: &ColumnDefinition) -> Result<String> {
        if self.profile.dialect == Dialect::Postgres && column.is_identity && column.custom_type.is_none() {
            let serial = match column.db_type {
                Some(DbType::Int64) => "bigserial",
                Some(DbType::Int16) => "smallserial",
                _ => "serial",
            };
            return Ok(serial.to_string());
        }

        self.native_type(column)
    }

    fn format_collation(&self, column: &ColumnDefinition) -> String {
        match &column.collation {
            Some(collation) if self.profile.dialect == Dialect::Postgres => {
                format!("COLLATE {}", self.profile.quoter.quote(collation))
            }
            Some(collation) => format!("COLLATE {}", collation),
            None => String::new(),
        }
    }

    pub fn format_nullable(&self, column: &ColumnDefinition) -> String {
        match column.nullable {
            Some(true) if self.profile.dialect == Dialect::SqlServer => "NULL".to_string(),
            Some(true) => String::new(),
            _ => "NOT NULL".to_string(),
        }
    }

    /// `DEFAULT` clause; SQL Server defaults are named constraints
    pub fn format_default(&self, column: &ColumnDefinition, table_name: &str) -> Result<String> {
        let Some(value) = &column.default_value else {
            return Ok(String::new());
        };

        let value = self.profile.quoter.quote_value(value)?;

        if self.profile.dialect == Dialect::SqlServer {
            let name = self.default_constraint_name(table_name, &column.name);
            return Ok(format!(
                "CONSTRAINT {} DEFAULT {}",
                self.profile.quoter.quote_constraint_name(&name),
                value
            ));
        }

        Ok(format!("DEFAULT {}", value))
    }

    fn format_primary_key(&self, column: &ColumnDefinition, inline_key: bool) -> String {
        match (inline_key && column.is_primary_key, self.profile.dialect) {
            (true, Dialect::Sqlite) if column.is_identity => "PRIMARY KEY AUTOINCREMENT".to_string(),
            (true, _) => "PRIMARY KEY".to_string(),
            (false, _) => String::new(),
        }
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if !column.is_identity {
            return String::new();
        }

        let identity = match self.profile.dialect {
            Dialect::SqlServer | Dialect::Snowflake => "IDENTITY(1,1)",
            Dialect::MySql => "AUTO_INCREMENT",
            Dialect::Oracle => "GENERATED BY DEFAULT ON NULL AS IDENTITY",
            Dialect::Hana => "GENERATED BY DEFAULT AS IDENTITY",
            // serial types and AUTOINCREMENT are rendered by other clauses
            Dialect::Postgres | Dialect::Sqlite => "",
        };
        identity.to_string()
    }

    fn format_description(&self, column: &ColumnDefinition) -> String {
        match &column.description {
            Some(description) => format!("COMMENT {}", self.profile.quoter.quote_string(description)),
            None => String::new(),
        }
    }

    /// Name of the default constraint SQL Server binds to a column
    pub fn default_constraint_name(&self, table_name: &str, column_name: &str) -> String {
        truncate_identifier(
            &get_default_constraint_name(table_name, column_name),
            self.profile.max_identifier_length,
        )
    }

    /// `CONSTRAINT .. FOREIGN KEY (..) REFERENCES .. (..)` with its rules
    pub fn foreign_key_clause(&self, foreign_key: &ForeignKeyDefinition) -> Result<String> {
        foreign_key.validate()?;

        let quoter = &self.profile.quoter;
        let name = match &foreign_key.name {
            Some(name) => name.clone(),
            None => truncate_identifier(
                &get_foreign_key_name(foreign_key),
                self.profile.max_identifier_length,
            ),
        };

        let mut clause = format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quoter.quote_constraint_name(&name),
            quoter.quote_column_list(&foreign_key.foreign_columns),
            quoter.quote_table_name(
                &foreign_key.primary_table,
                foreign_key.primary_table_schema.as_deref()
            ),
            quoter.quote_column_list(&foreign_key.primary_columns),
        );

        if let Some(rule) = foreign_key.on_delete.as_sql() {
            if self.profile.dialect == Dialect::Oracle && rule == "SET DEFAULT" {
                self.profile.unsupported(format!(
                    "ON DELETE SET DEFAULT (foreign key '{}')",
                    name
                ))?;
            } else {
                clause.push_str(" ON DELETE ");
                clause.push_str(rule);
            }
        }

        if let Some(rule) = foreign_key.on_update.as_sql() {
            if self.profile.dialect == Dialect::Oracle {
                self.profile.unsupported(format!("ON UPDATE rules (foreign key '{}')", name))?;
            } else {
                clause.push_str(" ON UPDATE ");
                clause.push_str(rule);
            }
        }

        Ok(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::generator::dialect::{CompatibilityMode, DialectOptions};
    use crate::model::types::Rule;
    use crate::model::value::{LiteralValue, SystemMethod};

    fn profile(dialect: Dialect) -> DialectProfile {
        DialectProfile::new(dialect, CompatibilityMode::Strict, &DialectOptions::default())
    }

    #[test]
    fn test_nullable_column_has_no_not_null_or_default() {
        let profile = profile(Dialect::MySql);
        let column = ColumnDefinition::new("C1", DbType::String).nullable(true);
        let sql = ColumnGenerator::new(&profile).generate(&column, "T").unwrap();

        assert_eq!(sql, "`C1` NVARCHAR(255)");
        assert!(!sql.contains("NOT NULL"));
        assert!(!sql.contains("DEFAULT"));
    }

    #[test]
    fn test_default_precedes_nullable_where_required() {
        for dialect in [Dialect::Oracle, Dialect::Hana] {
            let profile = profile(dialect);
            let column = ColumnDefinition::new("Status", DbType::Int32).default_value(1);
            let sql = ColumnGenerator::new(&profile).generate(&column, "T").unwrap();

            let default_at = sql.find("DEFAULT 1").unwrap();
            let nullable_at = sql.find("NOT NULL").unwrap();
            assert!(default_at < nullable_at, "{}: {}", dialect, sql);
        }
    }

    #[test]
    fn test_sqlserver_named_default() {
        let profile = profile(Dialect::SqlServer);
        let column = ColumnDefinition::new("Created", DbType::DateTime)
            .default_value(SystemMethod::CurrentDateTime);
        let sql = ColumnGenerator::new(&profile).generate(&column, "Orders").unwrap();

        assert_eq!(sql, "[Created] DATETIME NOT NULL CONSTRAINT [DF_Orders_Created] DEFAULT GETDATE()");
    }

    #[test]
    fn test_identity_syntax() {
        let column = ColumnDefinition::new("Id", DbType::Int64).identity().primary_key();

        let render = |dialect| {
            let profile = profile(dialect);
            ColumnGenerator::new(&profile).generate(&column, "T").unwrap()
        };

        assert_eq!(render(Dialect::SqlServer), "[Id] BIGINT NOT NULL IDENTITY(1,1) PRIMARY KEY");
        assert_eq!(render(Dialect::Postgres), "\"Id\" bigserial NOT NULL PRIMARY KEY");
        assert_eq!(render(Dialect::MySql), "`Id` BIGINT NOT NULL PRIMARY KEY AUTO_INCREMENT");
        assert_eq!(render(Dialect::Sqlite), "\"Id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT");
    }

    #[test]
    fn test_composite_key_is_hoisted() {
        let profile = profile(Dialect::Postgres);
        let columns = vec![
            ColumnDefinition::new("a", DbType::Int32).primary_key(),
            ColumnDefinition::new("b", DbType::Int32).primary_key(),
        ];
        let sql = ColumnGenerator::new(&profile).generate_all(&columns, "t").unwrap();

        assert_eq!(sql, "\"a\" integer NOT NULL, \"b\" integer NOT NULL, PRIMARY KEY (\"a\", \"b\")");
    }

    #[test]
    fn test_named_key_is_hoisted() {
        let profile = profile(Dialect::Postgres);
        let columns = vec![ColumnDefinition::new("id", DbType::Int32).primary_key_named("pk_t")];
        let sql = ColumnGenerator::new(&profile).generate_all(&columns, "t").unwrap();

        assert_eq!(sql, "\"id\" integer NOT NULL, CONSTRAINT \"pk_t\" PRIMARY KEY (\"id\")");
    }

    #[test]
    fn test_sqlite_single_identity_key_stays_inline() {
        let profile = profile(Dialect::Sqlite);
        let columns = vec![
            ColumnDefinition::new("id", DbType::Int32).identity().primary_key_named("pk_t"),
            ColumnDefinition::new("name", DbType::String),
        ];
        let generator = ColumnGenerator::new(&profile);

        assert!(!generator.should_hoist_primary_key(&columns));
        let sql = generator.generate_all(&columns, "t").unwrap();
        assert_eq!(sql.matches("PRIMARY KEY").count(), 1);
        assert!(sql.contains("PRIMARY KEY AUTOINCREMENT"));
    }

    #[test]
    fn test_sqlite_identity_outside_single_key() {
        let composite = vec![
            ColumnDefinition::new("a", DbType::Int32).identity().primary_key(),
            ColumnDefinition::new("b", DbType::Int32).primary_key(),
        ];
        let non_key = vec![
            ColumnDefinition::new("id", DbType::Int32).primary_key(),
            ColumnDefinition::new("seq", DbType::Int32).identity(),
        ];

        let strict = profile(Dialect::Sqlite);
        for columns in [&composite, &non_key] {
            assert!(matches!(
                ColumnGenerator::new(&strict).generate_all(columns, "T"),
                Err(Error::NotSupported(_))
            ));
        }

        let emulate = DialectProfile::new(Dialect::Sqlite, CompatibilityMode::Emulate, &DialectOptions::default());
        let generator = ColumnGenerator::new(&emulate);
        assert_eq!(
            generator.generate_all(&composite, "T").unwrap(),
            "\"a\" INTEGER NOT NULL, \"b\" INTEGER NOT NULL, PRIMARY KEY (\"a\", \"b\")"
        );
        assert_eq!(
            generator.generate_all(&non_key, "T").unwrap(),
            "\"id\" INTEGER NOT NULL PRIMARY KEY, \"seq\" INTEGER NOT NULL"
        );
    }

    #[test]
    fn test_mysql_inline_comment() {
        let profile = profile(Dialect::MySql);
        let column = ColumnDefinition::new("Name", DbType::String).description("Display name");
        let sql = ColumnGenerator::new(&profile).generate(&column, "T").unwrap();

        assert_eq!(sql, "`Name` NVARCHAR(255) NOT NULL COMMENT 'Display name'");
    }

    #[test]
    fn test_default_literal() {
        let profile = profile(Dialect::Postgres);
        let column = ColumnDefinition::new("name", DbType::String)
            .size(50)
            .default_value(LiteralValue::from("n/a"));
        let sql = ColumnGenerator::new(&profile).generate(&column, "t").unwrap();

        assert_eq!(sql, "\"name\" varchar(50) NOT NULL DEFAULT 'n/a'");
    }

    #[test]
    fn test_foreign_key_clause() {
        let profile = profile(Dialect::Postgres);
        let fk = ForeignKeyDefinition::new("orders", &["customer_id"], "customers", &["id"])
            .on_delete(Rule::Cascade);
        let sql = ColumnGenerator::new(&profile).foreign_key_clause(&fk).unwrap();

        assert_eq!(
            sql,
            "CONSTRAINT \"FK_orders_customer_id_customers_id\" FOREIGN KEY (\"customer_id\") \
             REFERENCES \"public\".\"customers\" (\"id\") ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_foreign_key_column_count_mismatch() {
        let profile = profile(Dialect::Postgres);
        let generator = ColumnGenerator::new(&profile);

        for (foreign, primary) in [(1, 2), (2, 1), (3, 1), (1, 3)] {
            let foreign_columns: Vec<String> = (0..foreign).map(|i| format!("f{}", i)).collect();
            let primary_columns: Vec<String> = (0..primary).map(|i| format!("p{}", i)).collect();
            let mut fk = ForeignKeyDefinition::new("a", &[], "b", &[]);
            fk.foreign_columns = foreign_columns;
            fk.primary_columns = primary_columns;

            assert!(matches!(generator.foreign_key_clause(&fk), Err(Error::ValidationError(_))));
        }
    }

    #[test]
    fn test_oracle_on_update_follows_compatibility_mode() {
        let fk = ForeignKeyDefinition::new("orders", &["customer_id"], "customers", &["id"])
            .on_update(Rule::Cascade);

        let strict = profile(Dialect::Oracle);
        assert!(ColumnGenerator::new(&strict).foreign_key_clause(&fk).is_err());

        let emulate = DialectProfile::new(Dialect::Oracle, CompatibilityMode::Emulate, &DialectOptions::default());
        let sql = ColumnGenerator::new(&emulate).foreign_key_clause(&fk).unwrap();
        assert!(!sql.contains("ON UPDATE"));
    }
}

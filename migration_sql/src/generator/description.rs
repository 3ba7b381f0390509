//! Table and column descriptions
//!
//! Descriptions are stored as comments or extended properties, depending on
//! the engine. MySQL keeps them inline in the DDL, so it only needs
//! statements when a table comment changes later.

use crate::generator::dialect::{Dialect, DialectProfile};
use crate::model::types::TableDefinition;

pub struct DescriptionGenerator<'a> {
    profile: &'a DialectProfile,
}

impl<'a> DescriptionGenerator<'a> {
    pub fn new(profile: &'a DialectProfile) -> Self {
        Self { profile }
    }

    /// Statements attaching a new table's descriptions
    pub fn create_table_descriptions(&self, table: &TableDefinition) -> Vec<String> {
        let schema = table.schema_name.as_deref();
        let mut statements = Vec::new();

        if let Some(description) = &table.description {
            statements.extend(self.table_description(schema, &table.name, description, false));
        }

        for column in &table.columns {
            if let Some(description) = &column.description {
                statements.extend(self.column_description(schema, &table.name, &column.name, description, false));
            }
        }

        statements
    }

    /// Describe a table; `replace` drops an existing description first where needed
    pub fn table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
        replace: bool,
    ) -> Option<String> {
        let quoter = &self.profile.quoter;

        match self.profile.dialect {
            Dialect::Postgres | Dialect::Oracle | Dialect::Hana | Dialect::Snowflake => Some(format!(
                "COMMENT ON TABLE {} IS {}",
                quoter.quote_table_name(table, schema),
                quoter.quote_string(description)
            )),
            Dialect::SqlServer => Some(self.extended_property(schema, table, None, description, replace)),
            Dialect::MySql if replace => Some(format!(
                "ALTER TABLE {} COMMENT {}",
                quoter.quote_table_name(table, schema),
                quoter.quote_string(description)
            )),
            Dialect::MySql | Dialect::Sqlite => None,
        }
    }

    /// Describe a column
    pub fn column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
        replace: bool,
    ) -> Option<String> {
        let quoter = &self.profile.quoter;

        match self.profile.dialect {
            Dialect::Postgres | Dialect::Oracle | Dialect::Hana | Dialect::Snowflake => Some(format!(
                "COMMENT ON COLUMN {}.{} IS {}",
                quoter.quote_table_name(table, schema),
                quoter.quote_column_name(column),
                quoter.quote_string(description)
            )),
            Dialect::SqlServer => {
                Some(self.extended_property(schema, table, Some(column), description, replace))
            }
            // MySQL renders column comments inline
            Dialect::MySql | Dialect::Sqlite => None,
        }
    }

    fn extended_property(
        &self,
        schema: Option<&str>,
        table: &str,
        column: Option<&str>,
        description: &str,
        replace: bool,
    ) -> String {
        let quoter = &self.profile.quoter;
        let schema = schema
            .filter(|s| !s.is_empty())
            .or(quoter.default_schema())
            .unwrap_or("dbo");

        let mut levels = format!(
            "@level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
            quoter.quote_string(schema),
            quoter.quote_string(table)
        );
        if let Some(column) = column {
            levels.push_str(&format!(
                ", @level2type = N'COLUMN', @level2name = {}",
                quoter.quote_string(column)
            ));
        }

        let add = format!(
            "EXEC sys.sp_addextendedproperty @name = N'MS_Description', @value = {}, {}",
            quoter.quote_string(description),
            levels
        );

        if !replace {
            return add;
        }

        let column_filter = match column {
            Some(column) => format!("N'COLUMN', {}", quoter.quote_string(column)),
            None => "NULL, NULL".to_string(),
        };

        format!(
            "IF EXISTS (SELECT * FROM fn_listextendedproperty(N'MS_Description', N'SCHEMA', {}, N'TABLE', {}, {}))\n    EXEC sys.sp_dropextendedproperty @name = N'MS_Description', {};\n{}",
            quoter.quote_string(schema),
            quoter.quote_string(table),
            column_filter,
            levels,
            add
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::dialect::{CompatibilityMode, DialectOptions};
    use crate::model::types::{ColumnDefinition, DbType};

    fn profile(dialect: Dialect) -> DialectProfile {
        DialectProfile::new(dialect, CompatibilityMode::Strict, &DialectOptions::default())
    }

    fn described_table() -> TableDefinition {
        TableDefinition::new("Users")
            .description("All users")
            .with_column(ColumnDefinition::new("Id", DbType::Int32).description("Key"))
            .with_column(ColumnDefinition::new("Name", DbType::String))
    }

    #[test]
    fn test_comment_on_statements() {
        let profile = profile(Dialect::Postgres);
        let statements = DescriptionGenerator::new(&profile).create_table_descriptions(&described_table());

        assert_eq!(
            statements,
            vec![
                "COMMENT ON TABLE \"public\".\"Users\" IS 'All users'".to_string(),
                "COMMENT ON COLUMN \"public\".\"Users\".\"Id\" IS 'Key'".to_string(),
            ]
        );
    }

    #[test]
    fn test_sqlserver_extended_properties() {
        let profile = profile(Dialect::SqlServer);
        let generator = DescriptionGenerator::new(&profile);
        let statements = generator.create_table_descriptions(&described_table());

        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            "EXEC sys.sp_addextendedproperty @name = N'MS_Description', @value = N'All users', \
             @level0type = N'SCHEMA', @level0name = N'dbo', @level1type = N'TABLE', @level1name = N'Users'"
        );
        assert!(statements[1].ends_with("@level2type = N'COLUMN', @level2name = N'Id'"));

        let replaced = generator.table_description(None, "Users", "Everyone", true).unwrap();
        assert!(replaced.starts_with("IF EXISTS (SELECT * FROM fn_listextendedproperty"));
        assert!(replaced.contains("sp_dropextendedproperty"));
        assert!(replaced.contains("@value = N'Everyone'"));
    }

    #[test]
    fn test_mysql_and_sqlite_have_no_separate_statements() {
        for dialect in [Dialect::MySql, Dialect::Sqlite] {
            let profile = profile(dialect);
            assert!(DescriptionGenerator::new(&profile)
                .create_table_descriptions(&described_table())
                .is_empty());
        }

        let profile = profile(Dialect::MySql);
        assert_eq!(
            DescriptionGenerator::new(&profile).table_description(None, "Users", "x", true),
            Some("ALTER TABLE `Users` COMMENT 'x'".to_string())
        );
    }
}

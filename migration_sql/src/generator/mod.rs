//! SQL generation
//!
//! `Generator` turns one `Expression` into SQL for the dialect it was built
//! for. Dialect differences come from the `DialectProfile`; the few
//! statements that don't fit a template live in `dialects`.

pub mod column;
pub mod description;
pub mod dialect;
pub mod dialects;
pub mod quoter;
pub mod type_map;

pub use column::ColumnGenerator;
pub use description::DescriptionGenerator;
pub use dialect::{CompatibilityMode, Dialect, DialectOptions, DialectProfile};
pub use quoter::{QuotePolicy, Quoter};
pub use type_map::TypeMap;

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::generator::dialect::ColumnClause;
use crate::model::expressions::*;
use crate::model::types::{
    ColumnDefinition, ConstraintDefinition, ConstraintType, Direction, ForeignKeyDefinition,
    IndexDefinition,
};
use crate::utils::naming::{
    format_name, get_index_name, get_primary_key_name, get_unique_constraint_name,
    truncate_identifier,
};

/// Generates SQL for a single dialect
#[derive(Debug, Clone)]
pub struct Generator {
    profile: DialectProfile,
}

impl Generator {
    /// Strict generator with default dialect options
    pub fn new(dialect: Dialect) -> Self {
        Self::with_options(dialect, CompatibilityMode::Strict, &DialectOptions::default())
    }

    pub fn with_options(
        dialect: Dialect,
        compatibility_mode: CompatibilityMode,
        options: &DialectOptions,
    ) -> Self {
        Self::from_profile(DialectProfile::new(dialect, compatibility_mode, options))
    }

    pub fn from_profile(profile: DialectProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DialectProfile {
        &self.profile
    }

    pub fn dialect(&self) -> Dialect {
        self.profile.dialect
    }

    pub fn compatibility_mode(&self) -> CompatibilityMode {
        self.profile.compatibility_mode
    }

    pub fn quoter(&self) -> &Quoter {
        &self.profile.quoter
    }

    pub fn columns(&self) -> ColumnGenerator<'_> {
        ColumnGenerator::new(&self.profile)
    }

    pub fn descriptions(&self) -> DescriptionGenerator<'_> {
        DescriptionGenerator::new(&self.profile)
    }

    /// Generate SQL for an expression as one executable string.
    ///
    /// Returns an empty string when emulate mode skipped the operation.
    pub fn generate(&self, expression: &Expression) -> Result<String> {
        let statements = self.generate_statements(expression)?;
        Ok(self.join_statements(statements))
    }

    /// Generate the individual statements for an expression
    pub fn generate_statements(&self, expression: &Expression) -> Result<Vec<String>> {
        expression.validate()?;
        debug!(dialect = %self.dialect(), expression = expression.kind(), "Generating SQL");

        let statements = match expression {
            Expression::CreateSchema(e) => self.create_schema(e)?,
            Expression::DeleteSchema(e) => self.delete_schema(e)?,
            Expression::AlterSchema(e) => self.alter_schema(e)?,
            Expression::CreateTable(e) => self.create_table(e)?,
            Expression::AlterTable(e) => self.alter_table(e),
            Expression::DeleteTable(e) => self.delete_table(e)?,
            Expression::RenameTable(e) => self.rename_table(e)?,
            Expression::CreateColumn(e) => self.create_column(e)?,
            Expression::AlterColumn(e) => self.alter_column(e)?,
            Expression::DeleteColumn(e) => self.delete_column(e)?,
            Expression::RenameColumn(e) => self.rename_column(e)?,
            Expression::CreateForeignKey(e) => self.create_foreign_key(&e.foreign_key)?,
            Expression::DeleteForeignKey(e) => self.delete_foreign_key(e)?,
            Expression::CreateIndex(e) => self.create_index(&e.index)?,
            Expression::DeleteIndex(e) => self.delete_index(e)?,
            Expression::CreateConstraint(e) => self.create_constraint(&e.constraint)?,
            Expression::DeleteConstraint(e) => self.delete_constraint(e)?,
            Expression::AlterDefaultConstraint(e) => self.alter_default_constraint(e)?,
            Expression::DeleteDefaultConstraint(e) => self.delete_default_constraint(e)?,
            Expression::CreateSequence(e) => self.create_sequence(e)?,
            Expression::DeleteSequence(e) => self.delete_sequence(e)?,
            Expression::InsertData(e) => self.insert_data(e)?,
            Expression::UpdateData(e) => self.update_data(e)?,
            Expression::DeleteData(e) => self.delete_data(e)?,
            Expression::CreateView(e) => self.create_view(e),
            Expression::DeleteView(e) => self.delete_view(e),
            Expression::CreateFunction(e) => self.create_function(e)?,
            Expression::DeleteFunction(e) => self.delete_function(e)?,
            Expression::CreateProcedure(e) => self.create_procedure(e)?,
            Expression::DeleteProcedure(e) => self.delete_procedure(e)?,
            Expression::ExecuteSql(e) => vec![e.sql.clone()],
            Expression::PerformDbOperation(e) => {
                debug!(
                    description = e.description.as_deref().unwrap_or(""),
                    "Database operation produces no SQL"
                );
                Vec::new()
            }
        };

        Ok(statements.into_iter().filter(|s| !s.trim().is_empty()).collect())
    }

    /// Join statements into one executable string.
    ///
    /// A single statement is returned as is. Oracle runs several statements
    /// in one anonymous block; other dialects separate them with `;`.
    pub fn join_statements(&self, statements: Vec<String>) -> String {
        if statements.len() <= 1 {
            return statements.into_iter().next().unwrap_or_default();
        }

        if self.dialect() == Dialect::Oracle {
            return dialects::oracle::wrap_in_block(&statements);
        }

        let mut sql = String::new();
        for statement in &statements {
            if !sql.is_empty() {
                if !sql.trim_end().ends_with(';') {
                    sql.push(';');
                }
                sql.push('\n');
            }
            sql.push_str(statement);
        }
        sql
    }

    fn unsupported(&self, operation: impl fmt::Display) -> Result<Vec<String>> {
        self.profile.unsupported(operation).map(|sql| vec![sql])
    }

    fn table_name(&self, table: &str, schema: &Option<String>) -> String {
        self.quoter().quote_table_name(table, schema.as_deref())
    }

    fn truncate(&self, name: String) -> String {
        truncate_identifier(&name, self.profile.max_identifier_length)
    }

    fn create_schema(&self, e: &CreateSchemaExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.create_schema else {
            return self.unsupported(format!("CREATE SCHEMA (schema '{}')", e.schema_name));
        };
        Ok(vec![format_name(template, &[("schema", &self.quoter().quote_schema_name(&e.schema_name))])])
    }

    fn delete_schema(&self, e: &DeleteSchemaExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_schema else {
            return self.unsupported(format!("DROP SCHEMA (schema '{}')", e.schema_name));
        };
        Ok(vec![format_name(template, &[("schema", &self.quoter().quote_schema_name(&e.schema_name))])])
    }

    fn alter_schema(&self, e: &AlterSchemaExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.alter_schema else {
            return self.unsupported(format!(
                "moving table '{}' to schema '{}'",
                e.table_name, e.destination_schema_name
            ));
        };

        let quoter = self.quoter();
        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&e.table_name, &e.source_schema_name)),
            ("destination", &quoter.quote_schema_name(&e.destination_schema_name)),
            ("name", &quoter.quote(&e.table_name)),
        ])])
    }

    fn create_table(&self, e: &CreateTableExpression) -> Result<Vec<String>> {
        let table = &e.table;
        let quoter = self.quoter();
        let columns = self.columns();

        let mut body = columns.generate_all(&table.columns, &table.name)?;
        if self.dialect() == Dialect::Sqlite {
            for foreign_key in &table.foreign_keys {
                body.push_str(", ");
                body.push_str(&columns.foreign_key_clause(foreign_key)?);
            }
        }

        let mut sql = format_name(self.profile.templates.create_table, &[
            ("table", &self.table_name(&table.name, &table.schema_name)),
            ("columns", &body),
        ]);
        if self.dialect() == Dialect::MySql {
            if let Some(description) = &table.description {
                sql.push_str(&format!(" COMMENT {}", quoter.quote_string(description)));
            }
        }

        let mut statements = vec![sql];
        statements.extend(self.descriptions().create_table_descriptions(table));

        if self.dialect() != Dialect::Sqlite {
            for foreign_key in &table.foreign_keys {
                statements.extend(self.create_foreign_key(foreign_key)?);
            }
        }

        for index in &table.indexes {
            statements.extend(self.create_index(index)?);
        }

        Ok(statements)
    }

    fn alter_table(&self, e: &AlterTableExpression) -> Vec<String> {
        match &e.description {
            Some(description) => self
                .descriptions()
                .table_description(e.schema_name.as_deref(), &e.table_name, description, true)
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    fn delete_table(&self, e: &DeleteTableExpression) -> Result<Vec<String>> {
        let table = self.table_name(&e.table_name, &e.schema_name);

        let template = if e.if_exists {
            let Some(template) = self.profile.templates.drop_table_if_exists else {
                return self.unsupported(format!("DROP TABLE IF EXISTS (table '{}')", e.table_name));
            };
            template
        } else {
            self.profile.templates.drop_table
        };

        Ok(vec![format_name(template, &[
            ("table", &table),
            ("drop_literal", &self.quoter().quote_string(&format!("DROP TABLE {}", table))),
        ])])
    }

    fn rename_table(&self, e: &RenameTableExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.rename_table else {
            return self.unsupported(format!("renaming table '{}'", e.old_name));
        };

        let quoter = self.quoter();
        let table = self.table_name(&e.old_name, &e.schema_name);
        Ok(vec![format_name(template, &[
            ("table", &table),
            ("new_name", &quoter.quote(&e.new_name)),
            ("new_table", &self.table_name(&e.new_name, &e.schema_name)),
            ("table_literal", &quoter.quote_string(&table)),
            ("new_name_literal", &quoter.quote_string(&e.new_name)),
        ])])
    }

    fn create_column(&self, e: &CreateColumnExpression) -> Result<Vec<String>> {
        let column = &e.column;

        let mut statements = match &column.set_existing_rows_to {
            Some(value) if column.is_not_null() => {
                // add as nullable, fill existing rows, then tighten
                let mut nullable = column.clone();
                nullable.nullable = Some(true);
                nullable.set_existing_rows_to = None;
                let mut statements = self.add_column(e, &nullable)?;

                let quoter = self.quoter();
                statements.push(format_name(self.profile.templates.update, &[
                    ("table", &self.table_name(&e.table_name, &e.schema_name)),
                    ("set", &format!("{} = {}", quoter.quote_column_name(&column.name), quoter.quote_value(value)?)),
                    ("where", "1 = 1"),
                ]));

                let mut restored = column.clone();
                restored.set_existing_rows_to = None;
                // inline comments are rewritten by the alter, separate ones are added below
                if !self.profile.column_clause_order.contains(&ColumnClause::Description) {
                    restored.description = None;
                }
                statements.extend(self.alter_column(&AlterColumnExpression {
                    schema_name: e.schema_name.clone(),
                    table_name: e.table_name.clone(),
                    column: restored,
                })?);
                statements
            }
            _ => self.add_column(e, column)?,
        };

        if let Some(description) = &column.description {
            statements.extend(self.descriptions().column_description(
                e.schema_name.as_deref(),
                &e.table_name,
                &column.name,
                description,
                false,
            ));
        }

        Ok(statements)
    }

    fn add_column(&self, e: &CreateColumnExpression, column: &ColumnDefinition) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.add_column else {
            return self.unsupported(format!("adding column '{}' to table '{}'", column.name, e.table_name));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
            ("column", &self.columns().generate(column, &e.table_name)?),
        ])])
    }

    fn alter_column(&self, e: &AlterColumnExpression) -> Result<Vec<String>> {
        let mut statements = match self.dialect() {
            Dialect::SqlServer => dialects::sqlserver::alter_column(&self.profile, e)?,
            Dialect::Postgres => vec![dialects::postgres::alter_column(&self.profile, e)?],
            Dialect::Snowflake => vec![dialects::snowflake::alter_column(&self.profile, e)?],
            _ => {
                let Some(template) = self.profile.templates.alter_column else {
                    return self.unsupported(format!(
                        "ALTER COLUMN (column '{}' on table '{}')",
                        e.column.name, e.table_name
                    ));
                };
                vec![format_name(template, &[
                    ("table", &self.table_name(&e.table_name, &e.schema_name)),
                    ("column", &self.columns().generate_for_alter(&e.column, &e.table_name)?),
                ])]
            }
        };

        if let Some(description) = &e.column.description {
            statements.extend(self.descriptions().column_description(
                e.schema_name.as_deref(),
                &e.table_name,
                &e.column.name,
                description,
                true,
            ));
        }

        Ok(statements)
    }

    fn delete_column(&self, e: &DeleteColumnExpression) -> Result<Vec<String>> {
        if self.dialect() == Dialect::SqlServer {
            return Ok(dialects::sqlserver::delete_columns(&self.profile, e));
        }

        let Some(template) = self.profile.templates.drop_column else {
            return self.unsupported(format!("dropping columns from table '{}'", e.table_name));
        };

        let table = self.table_name(&e.table_name, &e.schema_name);
        Ok(e.column_names
            .iter()
            .map(|column| {
                format_name(template, &[
                    ("table", &table),
                    ("column", &self.quoter().quote_column_name(column)),
                ])
            })
            .collect())
    }

    fn rename_column(&self, e: &RenameColumnExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.rename_column else {
            return self.unsupported(format!("renaming column '{}' on table '{}'", e.old_name, e.table_name));
        };

        let quoter = self.quoter();
        let table = self.table_name(&e.table_name, &e.schema_name);
        let old_name = quoter.quote_column_name(&e.old_name);
        Ok(vec![format_name(template, &[
            ("table", &table),
            ("old_name", &old_name),
            ("new_name", &quoter.quote_column_name(&e.new_name)),
            ("column_literal", &quoter.quote_string(&format!("{}.{}", table, old_name))),
            ("new_name_literal", &quoter.quote_string(&e.new_name)),
        ])])
    }

    fn create_foreign_key(&self, foreign_key: &ForeignKeyDefinition) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.add_foreign_key else {
            return self.unsupported(format!(
                "adding foreign key '{}' to an existing table",
                foreign_key.label()
            ));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&foreign_key.foreign_table, &foreign_key.foreign_table_schema)),
            ("constraint", &self.columns().foreign_key_clause(foreign_key)?),
        ])])
    }

    fn delete_foreign_key(&self, e: &DeleteForeignKeyExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_foreign_key else {
            return self.unsupported(format!("dropping foreign key '{}' from table '{}'", e.name, e.table_name));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
            ("name", &self.quoter().quote_constraint_name(&e.name)),
        ])])
    }

    fn create_index(&self, index: &IndexDefinition) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.create_index else {
            return self.unsupported(format!("indexes (index on table '{}')", index.table_name));
        };

        let quoter = self.quoter();
        let name = match &index.name {
            Some(name) => name.clone(),
            None => {
                let columns: Vec<&str> = index.columns.iter().map(|c| c.name.as_str()).collect();
                self.truncate(get_index_name(&index.table_name, &columns))
            }
        };

        let clustered = match (index.is_clustered, self.dialect()) {
            (false, _) => "",
            (true, Dialect::SqlServer) => "CLUSTERED ",
            (true, _) => {
                self.profile.unsupported(format!("clustered index '{}'", name))?;
                ""
            }
        };

        let columns = index
            .columns
            .iter()
            .map(|column| {
                let direction = match column.direction {
                    Direction::Ascending => "ASC",
                    Direction::Descending => "DESC",
                };
                format!("{} {}", quoter.quote_column_name(&column.name), direction)
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(vec![format_name(template, &[
            ("unique", if index.is_unique { "UNIQUE " } else { "" }),
            ("clustered", clustered),
            ("name", &quoter.quote_index_name(&name)),
            ("table", &self.table_name(&index.table_name, &index.schema_name)),
            ("columns", &columns),
        ])])
    }

    fn delete_index(&self, e: &DeleteIndexExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_index else {
            return self.unsupported(format!("indexes (index '{}' on table '{}')", e.index_name, e.table_name));
        };

        let quoter = self.quoter();
        Ok(vec![format_name(template, &[
            ("name", &quoter.quote_index_name(&e.index_name)),
            ("qualified_name", &self.table_name(&e.index_name, &e.schema_name)),
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
        ])])
    }

    fn constraint_name(&self, constraint: &ConstraintDefinition) -> String {
        if let Some(name) = &constraint.name {
            return name.clone();
        }

        let columns: Vec<&str> = constraint.columns.iter().map(String::as_str).collect();
        let name = match constraint.constraint_type {
            ConstraintType::PrimaryKey => get_primary_key_name(&constraint.table_name),
            ConstraintType::Unique => get_unique_constraint_name(&constraint.table_name, &columns),
        };
        self.truncate(name)
    }

    fn create_constraint(&self, constraint: &ConstraintDefinition) -> Result<Vec<String>> {
        let kind = match constraint.constraint_type {
            ConstraintType::PrimaryKey => "PRIMARY KEY",
            ConstraintType::Unique => "UNIQUE",
        };

        let Some(template) = self.profile.templates.add_constraint else {
            return self.unsupported(format!(
                "adding a {} constraint to existing table '{}'",
                kind, constraint.table_name
            ));
        };

        let quoter = self.quoter();
        let columns: Vec<&str> = constraint.columns.iter().map(String::as_str).collect();
        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&constraint.table_name, &constraint.schema_name)),
            ("name", &quoter.quote_constraint_name(&self.constraint_name(constraint))),
            ("kind", kind),
            ("columns", &quoter.quote_column_list(&columns)),
        ])])
    }

    fn delete_constraint(&self, e: &DeleteConstraintExpression) -> Result<Vec<String>> {
        let constraint = &e.constraint;

        if self.dialect() == Dialect::MySql {
            return Ok(vec![dialects::mysql::delete_constraint(&self.profile, e)]);
        }

        let Some(template) = self.profile.templates.drop_constraint else {
            return self.unsupported(format!(
                "dropping constraint '{}' from table '{}'",
                self.constraint_name(constraint),
                constraint.table_name
            ));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&constraint.table_name, &constraint.schema_name)),
            ("name", &self.quoter().quote_constraint_name(&self.constraint_name(constraint))),
        ])])
    }

    fn alter_default_constraint(&self, e: &AlterDefaultConstraintExpression) -> Result<Vec<String>> {
        if self.dialect() == Dialect::SqlServer {
            return dialects::sqlserver::alter_default_constraint(&self.profile, e, true);
        }

        let Some(template) = self.profile.templates.set_default else {
            return self.unsupported(format!(
                "changing the default of column '{}' on table '{}'",
                e.column_name, e.table_name
            ));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
            ("column", &self.quoter().quote_column_name(&e.column_name)),
            ("value", &self.quoter().quote_value(&e.default_value)?),
        ])])
    }

    fn delete_default_constraint(&self, e: &DeleteDefaultConstraintExpression) -> Result<Vec<String>> {
        if self.dialect() == Dialect::SqlServer {
            return Ok(vec![dialects::sqlserver::drop_default_script(
                &self.profile,
                &e.table_name,
                e.schema_name.as_deref(),
                &[e.column_name.as_str()],
            )]);
        }

        let Some(template) = self.profile.templates.drop_default else {
            return self.unsupported(format!(
                "dropping the default of column '{}' on table '{}'",
                e.column_name, e.table_name
            ));
        };

        Ok(vec![format_name(template, &[
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
            ("column", &self.quoter().quote_column_name(&e.column_name)),
        ])])
    }

    fn create_sequence(&self, e: &CreateSequenceExpression) -> Result<Vec<String>> {
        let sequence = &e.sequence;
        let Some(template) = self.profile.templates.create_sequence else {
            return self.unsupported(format!("sequences (sequence '{}')", sequence.name));
        };

        let snowflake = self.dialect() == Dialect::Snowflake;
        let mut options = String::new();

        if let Some(increment) = sequence.increment {
            options.push_str(&format!(" INCREMENT BY {}", increment));
        }
        if let Some(min_value) = sequence.min_value {
            if snowflake {
                self.profile.unsupported(format!("MINVALUE (sequence '{}')", sequence.name))?;
            } else {
                options.push_str(&format!(" MINVALUE {}", min_value));
            }
        }
        if let Some(max_value) = sequence.max_value {
            if snowflake {
                self.profile.unsupported(format!("MAXVALUE (sequence '{}')", sequence.name))?;
            } else {
                options.push_str(&format!(" MAXVALUE {}", max_value));
            }
        }
        if let Some(start_with) = sequence.start_with {
            options.push_str(&format!(" START WITH {}", start_with));
        }
        if let Some(cache) = sequence.cache {
            match self.dialect() {
                Dialect::Snowflake => {
                    self.profile.unsupported(format!("CACHE (sequence '{}')", sequence.name))?;
                }
                Dialect::Oracle if cache <= 1 => options.push_str(" NOCACHE"),
                _ => options.push_str(&format!(" CACHE {}", cache)),
            }
        }
        if sequence.cycle {
            if snowflake {
                self.profile.unsupported(format!("CYCLE (sequence '{}')", sequence.name))?;
            } else {
                options.push_str(" CYCLE");
            }
        }

        Ok(vec![format_name(template, &[
            ("name", &self.quoter().quote_object_name(&sequence.name, sequence.schema_name.as_deref())),
            ("options", &options),
        ])])
    }

    fn delete_sequence(&self, e: &DeleteSequenceExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_sequence else {
            return self.unsupported(format!("sequences (sequence '{}')", e.sequence_name));
        };

        Ok(vec![format_name(template, &[(
            "name",
            &self.quoter().quote_object_name(&e.sequence_name, e.schema_name.as_deref()),
        )])])
    }

    fn insert_data(&self, e: &InsertDataExpression) -> Result<Vec<String>> {
        let table = self.table_name(&e.table_name, &e.schema_name);

        let mut statements = if self.dialect() == Dialect::Oracle && e.rows.len() > 1 {
            vec![dialects::oracle::insert_all(&self.profile, &table, &e.rows)?]
        } else {
            e.rows
                .iter()
                .map(|row| self.insert_row(&table, row))
                .collect::<Result<Vec<_>>>()?
        };

        if e.identity_insert && self.dialect() == Dialect::SqlServer && !statements.is_empty() {
            statements = dialects::sqlserver::with_identity_insert(&table, statements);
        }

        Ok(statements)
    }

    fn insert_row(&self, table: &str, row: &DataRow) -> Result<String> {
        let quoter = self.quoter();
        let columns: Vec<&str> = row.keys().map(String::as_str).collect();
        let values = row
            .values()
            .map(|value| quoter.quote_value(value))
            .collect::<Result<Vec<_>>>()?;

        Ok(format_name(self.profile.templates.insert, &[
            ("table", table),
            ("columns", &quoter.quote_column_list(&columns)),
            ("values", &values.join(", ")),
        ]))
    }

    /// `col = value AND other IS NULL`; an empty row matches every row
    fn where_clause(&self, row: &DataRow) -> Result<String> {
        if row.is_empty() {
            return Ok("1 = 1".to_string());
        }

        let quoter = self.quoter();
        let predicates = row
            .iter()
            .map(|(column, value)| -> Result<String> {
                let column = quoter.quote_column_name(column);
                if value.is_null() {
                    Ok(format!("{} IS NULL", column))
                } else {
                    Ok(format!("{} = {}", column, quoter.quote_value(value)?))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(predicates.join(" AND "))
    }

    fn update_data(&self, e: &UpdateDataExpression) -> Result<Vec<String>> {
        let quoter = self.quoter();
        let set = e
            .set
            .iter()
            .map(|(column, value)| -> Result<String> {
                Ok(format!("{} = {}", quoter.quote_column_name(column), quoter.quote_value(value)?))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let where_clause = if e.all_rows {
            "1 = 1".to_string()
        } else {
            self.where_clause(&e.where_clause)?
        };

        Ok(vec![format_name(self.profile.templates.update, &[
            ("table", &self.table_name(&e.table_name, &e.schema_name)),
            ("set", &set),
            ("where", &where_clause),
        ])])
    }

    fn delete_data(&self, e: &DeleteDataExpression) -> Result<Vec<String>> {
        let table = self.table_name(&e.table_name, &e.schema_name);

        if e.all_rows {
            return Ok(vec![format_name(self.profile.templates.delete, &[
                ("table", &table),
                ("where", "1 = 1"),
            ])]);
        }

        e.rows
            .iter()
            .map(|row| -> Result<String> {
                Ok(format_name(self.profile.templates.delete, &[
                    ("table", &table),
                    ("where", &self.where_clause(row)?),
                ]))
            })
            .collect()
    }

    fn create_view(&self, e: &CreateViewExpression) -> Vec<String> {
        vec![format_name(self.profile.templates.create_view, &[
            ("name", &self.table_name(&e.view.name, &e.view.schema_name)),
            ("definition", &e.view.definition),
        ])]
    }

    fn delete_view(&self, e: &DeleteViewExpression) -> Vec<String> {
        vec![format_name(self.profile.templates.drop_view, &[(
            "name",
            &self.table_name(&e.view_name, &e.schema_name),
        )])]
    }

    fn create_function(&self, e: &CreateFunctionExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.create_routine else {
            return self.unsupported(format!("functions (function '{}')", e.function.name));
        };
        Ok(vec![format_name(template, &[("body", &e.function.body)])])
    }

    fn delete_function(&self, e: &DeleteFunctionExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_function else {
            return self.unsupported(format!("functions (function '{}')", e.function_name));
        };
        Ok(vec![format_name(template, &[(
            "name",
            &self.table_name(&e.function_name, &e.schema_name),
        )])])
    }

    fn create_procedure(&self, e: &CreateProcedureExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.create_routine else {
            return self.unsupported(format!("stored procedures (procedure '{}')", e.procedure.name));
        };
        Ok(vec![format_name(template, &[("body", &e.procedure.body)])])
    }

    fn delete_procedure(&self, e: &DeleteProcedureExpression) -> Result<Vec<String>> {
        let Some(template) = self.profile.templates.drop_procedure else {
            return self.unsupported(format!("stored procedures (procedure '{}')", e.procedure_name));
        };
        Ok(vec![format_name(template, &[(
            "name",
            &self.table_name(&e.procedure_name, &e.schema_name),
        )])])
    }
}

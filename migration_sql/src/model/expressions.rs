//! Migration expressions
//!
//! An expression describes a single schema or data operation. Generators turn
//! one expression into SQL text; nothing here knows about dialects.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::types::{
    in_table, ColumnDefinition, ConstraintDefinition, ForeignKeyDefinition, FunctionDefinition,
    IndexDefinition, ProcedureDefinition, SequenceDefinition, TableDefinition, ViewDefinition,
};
use crate::model::value::LiteralValue;

/// Column name to value, in insertion order
pub type DataRow = IndexMap<String, LiteralValue>;

fn require(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(format!("{} cannot be empty", what)))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSchemaExpression {
    pub schema_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSchemaExpression {
    pub schema_name: String,
}

/// Move a table into another schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterSchemaExpression {
    #[serde(default)]
    pub source_schema_name: Option<String>,
    pub table_name: String,
    pub destination_schema_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableExpression {
    pub table: TableDefinition,
}

/// Table-level change; currently only the description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTableExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteTableExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    #[serde(default)]
    pub if_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameTableExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateColumnExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column: ColumnDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteColumnExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameColumnExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateForeignKeyExpression {
    pub foreign_key: ForeignKeyDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteForeignKeyExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexExpression {
    pub index: IndexDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteIndexExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub index_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateConstraintExpression {
    pub constraint: ConstraintDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteConstraintExpression {
    pub constraint: ConstraintDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterDefaultConstraintExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_name: String,
    pub default_value: LiteralValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDefaultConstraintExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSequenceExpression {
    pub sequence: SequenceDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSequenceExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub sequence_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertDataExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub rows: Vec<DataRow>,
    /// SQL Server: allow explicit values for an identity column
    #[serde(default)]
    pub identity_insert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDataExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    pub set: DataRow,
    #[serde(default)]
    pub where_clause: DataRow,
    #[serde(default)]
    pub all_rows: bool,
}

/// Each row is one conjunction of column = value predicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteDataExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub table_name: String,
    #[serde(default)]
    pub rows: Vec<DataRow>,
    #[serde(default)]
    pub all_rows: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewExpression {
    pub view: ViewDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteViewExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub view_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFunctionExpression {
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFunctionExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateProcedureExpression {
    pub procedure: ProcedureDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteProcedureExpression {
    #[serde(default)]
    pub schema_name: Option<String>,
    pub procedure_name: String,
}

/// Raw SQL passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteSqlExpression {
    pub sql: String,
}

/// Marker for a caller-supplied operation run directly against the connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PerformDbOperationExpression {
    #[serde(default)]
    pub description: Option<String>,
}

/// Every operation a migration can describe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    CreateSchema(CreateSchemaExpression),
    DeleteSchema(DeleteSchemaExpression),
    AlterSchema(AlterSchemaExpression),
    CreateTable(CreateTableExpression),
    AlterTable(AlterTableExpression),
    DeleteTable(DeleteTableExpression),
    RenameTable(RenameTableExpression),
    CreateColumn(CreateColumnExpression),
    AlterColumn(AlterColumnExpression),
    DeleteColumn(DeleteColumnExpression),
    RenameColumn(RenameColumnExpression),
    CreateForeignKey(CreateForeignKeyExpression),
    DeleteForeignKey(DeleteForeignKeyExpression),
    CreateIndex(CreateIndexExpression),
    DeleteIndex(DeleteIndexExpression),
    CreateConstraint(CreateConstraintExpression),
    DeleteConstraint(DeleteConstraintExpression),
    AlterDefaultConstraint(AlterDefaultConstraintExpression),
    DeleteDefaultConstraint(DeleteDefaultConstraintExpression),
    CreateSequence(CreateSequenceExpression),
    DeleteSequence(DeleteSequenceExpression),
    InsertData(InsertDataExpression),
    UpdateData(UpdateDataExpression),
    DeleteData(DeleteDataExpression),
    CreateView(CreateViewExpression),
    DeleteView(DeleteViewExpression),
    CreateFunction(CreateFunctionExpression),
    DeleteFunction(DeleteFunctionExpression),
    CreateProcedure(CreateProcedureExpression),
    DeleteProcedure(DeleteProcedureExpression),
    ExecuteSql(ExecuteSqlExpression),
    PerformDbOperation(PerformDbOperationExpression),
}

impl Expression {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::CreateSchema(_) => "CreateSchema",
            Expression::DeleteSchema(_) => "DeleteSchema",
            Expression::AlterSchema(_) => "AlterSchema",
            Expression::CreateTable(_) => "CreateTable",
            Expression::AlterTable(_) => "AlterTable",
            Expression::DeleteTable(_) => "DeleteTable",
            Expression::RenameTable(_) => "RenameTable",
            Expression::CreateColumn(_) => "CreateColumn",
            Expression::AlterColumn(_) => "AlterColumn",
            Expression::DeleteColumn(_) => "DeleteColumn",
            Expression::RenameColumn(_) => "RenameColumn",
            Expression::CreateForeignKey(_) => "CreateForeignKey",
            Expression::DeleteForeignKey(_) => "DeleteForeignKey",
            Expression::CreateIndex(_) => "CreateIndex",
            Expression::DeleteIndex(_) => "DeleteIndex",
            Expression::CreateConstraint(_) => "CreateConstraint",
            Expression::DeleteConstraint(_) => "DeleteConstraint",
            Expression::AlterDefaultConstraint(_) => "AlterDefaultConstraint",
            Expression::DeleteDefaultConstraint(_) => "DeleteDefaultConstraint",
            Expression::CreateSequence(_) => "CreateSequence",
            Expression::DeleteSequence(_) => "DeleteSequence",
            Expression::InsertData(_) => "InsertData",
            Expression::UpdateData(_) => "UpdateData",
            Expression::DeleteData(_) => "DeleteData",
            Expression::CreateView(_) => "CreateView",
            Expression::DeleteView(_) => "DeleteView",
            Expression::CreateFunction(_) => "CreateFunction",
            Expression::DeleteFunction(_) => "DeleteFunction",
            Expression::CreateProcedure(_) => "CreateProcedure",
            Expression::DeleteProcedure(_) => "DeleteProcedure",
            Expression::ExecuteSql(_) => "ExecuteSql",
            Expression::PerformDbOperation(_) => "PerformDbOperation",
        }
    }

    /// Check the required fields before any SQL is produced
    pub fn validate(&self) -> Result<()> {
        match self {
            Expression::CreateSchema(e) => require(&e.schema_name, "Schema name"),
            Expression::DeleteSchema(e) => require(&e.schema_name, "Schema name"),
            Expression::AlterSchema(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.destination_schema_name, "Destination schema name")
            }
            Expression::CreateTable(e) => e.table.validate(),
            Expression::AlterTable(e) => require(&e.table_name, "Table name"),
            Expression::DeleteTable(e) => require(&e.table_name, "Table name"),
            Expression::RenameTable(e) => {
                require(&e.old_name, "Old table name")?;
                require(&e.new_name, "New table name")
            }
            Expression::CreateColumn(e) => {
                require(&e.table_name, "Table name")?;
                e.column.validate().map_err(|err| in_table(err, &e.table_name))
            }
            Expression::AlterColumn(e) => {
                require(&e.table_name, "Table name")?;
                e.column.validate().map_err(|err| in_table(err, &e.table_name))
            }
            Expression::DeleteColumn(e) => {
                require(&e.table_name, "Table name")?;
                if e.column_names.is_empty() {
                    return Err(Error::validation(format!(
                        "At least one column must be deleted from table '{}'",
                        e.table_name
                    )));
                }
                e.column_names.iter().try_for_each(|c| require(c, "Column name"))
            }
            Expression::RenameColumn(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.old_name, "Old column name")?;
                require(&e.new_name, "New column name")
            }
            Expression::CreateForeignKey(e) => e.foreign_key.validate(),
            Expression::DeleteForeignKey(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.name, "Foreign key name")
            }
            Expression::CreateIndex(e) => e.index.validate(),
            Expression::DeleteIndex(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.index_name, "Index name")
            }
            Expression::CreateConstraint(e) => e.constraint.validate(),
            Expression::DeleteConstraint(e) => {
                require(&e.constraint.table_name, "Table name")?;
                match &e.constraint.name {
                    Some(name) => require(name, "Constraint name"),
                    None if e.constraint.columns.is_empty() => Err(Error::validation(format!(
                        "Constraint to delete from table '{}' needs a name or its columns",
                        e.constraint.table_name
                    ))),
                    None => Ok(()),
                }
            }
            Expression::AlterDefaultConstraint(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.column_name, "Column name")
            }
            Expression::DeleteDefaultConstraint(e) => {
                require(&e.table_name, "Table name")?;
                require(&e.column_name, "Column name")
            }
            Expression::CreateSequence(e) => e.sequence.validate(),
            Expression::DeleteSequence(e) => require(&e.sequence_name, "Sequence name"),
            Expression::InsertData(e) => {
                require(&e.table_name, "Table name")?;
                if let Some(index) = e.rows.iter().position(|row| row.is_empty()) {
                    return Err(Error::validation(format!(
                        "Row {} inserted into table '{}' has no values",
                        index + 1,
                        e.table_name
                    )));
                }
                Ok(())
            }
            Expression::UpdateData(e) => {
                require(&e.table_name, "Table name")?;
                if e.set.is_empty() {
                    return Err(Error::validation(format!(
                        "Update of table '{}' sets no columns",
                        e.table_name
                    )));
                }
                if !e.all_rows && e.where_clause.is_empty() {
                    return Err(Error::validation(format!(
                        "Update of table '{}' needs a WHERE clause or all_rows",
                        e.table_name
                    )));
                }
                Ok(())
            }
            Expression::DeleteData(e) => {
                require(&e.table_name, "Table name")?;
                if !e.all_rows && e.rows.is_empty() {
                    return Err(Error::validation(format!(
                        "Delete from table '{}' needs row predicates or all_rows",
                        e.table_name
                    )));
                }
                Ok(())
            }
            Expression::CreateView(e) => {
                require(&e.view.name, "View name")?;
                require(&e.view.definition, "View definition")
            }
            Expression::DeleteView(e) => require(&e.view_name, "View name"),
            Expression::CreateFunction(e) => {
                require(&e.function.name, "Function name")?;
                require(&e.function.body, "Function body")
            }
            Expression::DeleteFunction(e) => require(&e.function_name, "Function name"),
            Expression::CreateProcedure(e) => {
                require(&e.procedure.name, "Procedure name")?;
                require(&e.procedure.body, "Procedure body")
            }
            Expression::DeleteProcedure(e) => require(&e.procedure_name, "Procedure name"),
            Expression::ExecuteSql(_) | Expression::PerformDbOperation(_) => Ok(()),
        }
    }
}

macro_rules! impl_into_expression {
    ($($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(expression: $ty) -> Self {
                    Expression::$variant(expression)
                }
            }
        )+
    };
}

impl_into_expression! {
    CreateSchema => CreateSchemaExpression,
    DeleteSchema => DeleteSchemaExpression,
    AlterSchema => AlterSchemaExpression,
    CreateTable => CreateTableExpression,
    AlterTable => AlterTableExpression,
    DeleteTable => DeleteTableExpression,
    RenameTable => RenameTableExpression,
    CreateColumn => CreateColumnExpression,
    AlterColumn => AlterColumnExpression,
    DeleteColumn => DeleteColumnExpression,
    RenameColumn => RenameColumnExpression,
    CreateForeignKey => CreateForeignKeyExpression,
    DeleteForeignKey => DeleteForeignKeyExpression,
    CreateIndex => CreateIndexExpression,
    DeleteIndex => DeleteIndexExpression,
    CreateConstraint => CreateConstraintExpression,
    DeleteConstraint => DeleteConstraintExpression,
    AlterDefaultConstraint => AlterDefaultConstraintExpression,
    DeleteDefaultConstraint => DeleteDefaultConstraintExpression,
    CreateSequence => CreateSequenceExpression,
    DeleteSequence => DeleteSequenceExpression,
    InsertData => InsertDataExpression,
    UpdateData => UpdateDataExpression,
    DeleteData => DeleteDataExpression,
    CreateView => CreateViewExpression,
    DeleteView => DeleteViewExpression,
    CreateFunction => CreateFunctionExpression,
    DeleteFunction => DeleteFunctionExpression,
    CreateProcedure => CreateProcedureExpression,
    DeleteProcedure => DeleteProcedureExpression,
    ExecuteSql => ExecuteSqlExpression,
    PerformDbOperation => PerformDbOperationExpression,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::{ColumnDefinition, DbType};

    #[test]
    fn test_expression_json_roundtrip_shape() {
        let json = r#"{
            "type": "create_column",
            "table_name": "users",
            "column": { "name": "email", "db_type": "String", "size": 200 }
        }"#;
        let expression: Expression = serde_json::from_str(json).unwrap();
        assert_eq!(expression.kind(), "CreateColumn");
        assert!(expression.validate().is_ok());
    }

    #[test]
    fn test_update_requires_predicate() {
        let mut set = DataRow::new();
        set.insert("name".to_string(), LiteralValue::from("x"));
        let expression = Expression::from(UpdateDataExpression {
            schema_name: None,
            table_name: "users".to_string(),
            set,
            where_clause: DataRow::new(),
            all_rows: false,
        });
        assert!(expression.validate().unwrap_err().to_string().contains("users"));
    }

    #[test]
    fn test_column_error_names_table() {
        let expression = Expression::from(AlterColumnExpression {
            schema_name: None,
            table_name: "users".to_string(),
            column: ColumnDefinition::new("", DbType::Int32),
        });
        let message = expression.validate().unwrap_err().to_string();
        assert!(message.contains("Column name cannot be empty"));
        assert!(message.contains("users"));
    }

    #[test]
    fn test_delete_column_requires_names() {
        let expression = Expression::from(DeleteColumnExpression {
            schema_name: None,
            table_name: "users".to_string(),
            column_names: vec![],
        });
        assert!(expression.validate().is_err());
    }
}

//! Migration data model
//!
//! Descriptor records, literal values and the expressions that carry them.

pub mod expressions;
pub mod types;
pub mod value;

// Re-export key types
pub use expressions::{DataRow, Expression};
pub use types::{
    ColumnDefinition, ConstraintDefinition, ConstraintType, DbType, Direction,
    ForeignKeyDefinition, FunctionDefinition, IndexColumnDefinition, IndexDefinition,
    ProcedureDefinition, Rule, SequenceDefinition, TableDefinition, ViewDefinition,
};
pub use value::{LiteralValue, SystemMethod};

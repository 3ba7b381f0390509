//! Naming utilities for migration_sql
//!
//! Default names for indexes and constraints when a migration leaves them
//! unset, plus the helpers that keep generated names inside a dialect's
//! identifier limit.

use crate::model::types::ForeignKeyDefinition;

/// Pattern for index names
pub const INDEX_PATTERN: &str = "IX_{table}_{columns}";
/// Pattern for foreign key names
pub const FOREIGN_KEY_PATTERN: &str = "FK_{foreign_table}_{foreign_columns}_{primary_table}_{primary_columns}";
/// Pattern for primary key constraint names
pub const PRIMARY_KEY_PATTERN: &str = "PK_{table}";
/// Pattern for unique constraint names
pub const UNIQUE_PATTERN: &str = "UC_{table}_{columns}";
/// Pattern for SQL Server default constraint names
pub const DEFAULT_CONSTRAINT_PATTERN: &str = "DF_{table}_{column}";

/// Format a name according to a pattern with placeholders.
///
/// Substitution is a single pass, so values are never rescanned and unknown
/// placeholders are kept as written.
pub fn format_name(pattern: &str, replacements: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find('{') {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];

        let replaced = tail[1..].find('}').and_then(|end| {
            let key = &tail[1..=end];
            replacements
                .iter()
                .find(|(placeholder, _)| *placeholder == key)
                .map(|(_, value)| (*value, end + 2))
        });

        match replaced {
            Some((value, consumed)) => {
                result.push_str(value);
                rest = &tail[consumed..];
            }
            None => {
                result.push('{');
                rest = &tail[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Get index name from table and columns according to pattern
pub fn get_index_name<S: AsRef<str>>(table_name: &str, columns: &[S]) -> String {
    let columns_str = join_names(columns);

    format_name(INDEX_PATTERN, &[
        ("table", table_name),
        ("columns", &columns_str),
    ])
}

/// Get foreign key constraint name according to pattern
pub fn get_foreign_key_name(foreign_key: &ForeignKeyDefinition) -> String {
    format_name(FOREIGN_KEY_PATTERN, &[
        ("foreign_table", &foreign_key.foreign_table),
        ("foreign_columns", &join_names(&foreign_key.foreign_columns)),
        ("primary_table", &foreign_key.primary_table),
        ("primary_columns", &join_names(&foreign_key.primary_columns)),
    ])
}

/// Get primary key constraint name for a table
pub fn get_primary_key_name(table_name: &str) -> String {
    format_name(PRIMARY_KEY_PATTERN, &[("table", table_name)])
}

/// Get unique constraint name from table and columns
pub fn get_unique_constraint_name<S: AsRef<str>>(table_name: &str, columns: &[S]) -> String {
    format_name(UNIQUE_PATTERN, &[
        ("table", table_name),
        ("columns", &join_names(columns)),
    ])
}

/// Get default constraint name for a column
pub fn get_default_constraint_name(table_name: &str, column_name: &str) -> String {
    format_name(DEFAULT_CONSTRAINT_PATTERN, &[
        ("table", table_name),
        ("column", column_name),
    ])
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("_")
}

/// Truncate an identifier to fit database limits
pub fn truncate_identifier(name: &str, max_length: usize) -> String {
    if name.len() <= max_length {
        return name.to_string();
    }

    // Hash suffix: 8 hex chars plus an underscore
    let hash = format!("{:x}", md5::compute(name.as_bytes()));
    if max_length <= 9 {
        return hash[..max_length.min(hash.len())].to_string();
    }

    let mut keep_length = max_length - 9;
    while !name.is_char_boundary(keep_length) {
        keep_length -= 1;
    }

    format!("{}_{}", &name[..keep_length], &hash[0..8])
}

/// Check if a name is a reserved SQL keyword
pub fn is_sql_keyword(name: &str) -> bool {
    // Common SQL keywords across databases
    const SQL_KEYWORDS: &[&str] = &[
        "add", "all", "alter", "and", "any", "as", "asc", "backup", "begin", "between",
        "by", "case", "check", "column", "constraint", "create", "database", "default",
        "delete", "desc", "distinct", "drop", "else", "end", "except", "exec", "exists",
        "foreign", "from", "full", "group", "having", "in", "index", "inner", "insert",
        "intersect", "into", "is", "join", "key", "left", "like", "limit", "not",
        "null", "on", "or", "order", "outer", "primary", "procedure", "references", "right",
        "rownum", "select", "set", "table", "top", "truncate", "union", "unique",
        "update", "user", "values", "view", "where", "with"
    ];

    SQL_KEYWORDS.contains(&name.to_lowercase().as_str())
}

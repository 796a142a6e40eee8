//! SQL statement construction.
//!
//! Structural parts of a statement (table and column names) cannot be
//! parameterized, so they are validated against a restricted charset and
//! spliced in double-quoted. Values are always bound as parameters, never
//! interpolated into the statement text.

use crate::schema::{ColumnSpec, TableSchema};

/// Check a table or column name against the allowed identifier charset:
/// ASCII alphanumeric or underscore, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote(name: &str) -> String {
    format!("\"{name}\"")
}

/// Build the CREATE TABLE statement for a declared schema, with every
/// column declared NOT NULL.
pub fn create_table(table: &str, columns: &[ColumnSpec]) -> String {
    let cols = columns
        .iter()
        .map(|c| format!("{} {} NOT NULL", quote(&c.name), c.ty.sql_name()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE IF NOT EXISTS {} ({});", quote(table), cols)
}

/// Build the INSERT statement, binding one named parameter per column.
pub fn insert(table: &str, schema: &TableSchema) -> String {
    let cols = schema
        .columns()
        .iter()
        .map(|c| quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let params = schema
        .columns()
        .iter()
        .map(|c| format!(":{}", c.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({}) VALUES ({});", quote(table), cols, params)
}

/// Build the top-N SELECT, ordered descending on `order_by`.
///
/// Columns are listed explicitly in declaration order so decoding stays
/// positionally aligned with the schema even when the on-disk table
/// predates this process.
pub fn select_top(table: &str, schema: &TableSchema, order_by: &str) -> String {
    let cols = schema
        .columns()
        .iter()
        .map(|c| quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "SELECT {} FROM {} ORDER BY {} DESC LIMIT :limit;",
        cols,
        quote(table),
        quote(order_by)
    )
}

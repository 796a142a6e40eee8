//! Error types for tabstore.

use thiserror::Error;

/// Main error type for tabstore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error while declaring a table schema
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Error while inserting a row
    #[error("insert error: {0}")]
    Insert(#[from] InsertError),

    /// Error while querying rows
    #[error("query error: {0}")]
    Query(#[from] QueryError),
}

/// Errors related to declaring table schemas.
///
/// Everything except `EngineFailure` is detected locally, before any
/// statement reaches the engine, and leaves registry and storage untouched.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Table name already registered
    #[error("table already exists: {table}")]
    AlreadyExists { table: String },

    /// Table or column name outside the allowed identifier charset
    #[error("invalid identifier: {name:?}")]
    InvalidIdentifier { name: String },

    /// Schema declared with no columns
    #[error("table {table} declared with no columns")]
    NoColumns { table: String },

    /// Column name repeated within one declaration
    #[error("duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },

    /// Engine rejected or failed the statement
    #[error("engine failure: {0}")]
    EngineFailure(#[from] rusqlite::Error),
}

/// Errors related to inserting rows.
#[derive(Error, Debug)]
pub enum InsertError {
    /// Table was never declared on this store
    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    /// Value count does not match the declared column count
    #[error("table {table} expects {expected} values, got {actual}")]
    ArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// Engine rejected or failed the statement
    #[error("engine failure: {0}")]
    EngineFailure(#[from] rusqlite::Error),
}

/// Errors related to querying rows.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Table was never declared on this store
    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    /// Order-by column is not part of the table's declared schema
    #[error("unknown column: {column} in table {table}")]
    UnknownColumn { table: String, column: String },

    /// Engine rejected or failed the statement
    #[error("engine failure: {0}")]
    EngineFailure(#[from] rusqlite::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

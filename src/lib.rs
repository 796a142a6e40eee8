//! tabstore - Persist simple tabular data in a local SQLite file.
//!
//! This library tracks declared table schemas in memory, turns typed
//! declarations and row values into parameterized SQL statements, and
//! delegates execution to SQLite via rusqlite. It exposes three
//! operations: define a table schema, insert a row, and query the top N
//! rows ordered by a column.
//!
//! # Example
//!
//! ```no_run
//! use tabstore::{ColumnSpec, ColumnType, TableStore};
//!
//! fn main() -> tabstore::Result<()> {
//!     let store = TableStore::new("scores.db");
//!     store.define_schema(
//!         "high_score",
//!         vec![
//!             ColumnSpec::new("name", ColumnType::Text),
//!             ColumnSpec::new("score", ColumnType::Integer),
//!         ],
//!     )?;
//!     store.insert("high_score", vec!["US Grant".into(), 4242.into()])?;
//!     for row in store.query_top("high_score", "score", 10)? {
//!         println!("{row:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod schema;
pub mod store;
pub mod value;

mod sql;

pub use error::{Error, InsertError, QueryError, Result, SchemaError};
pub use schema::{ColumnSpec, ColumnType, TableSchema};
pub use store::TableStore;
pub use value::{Row, Value};

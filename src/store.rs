//! The table store: an in-memory schema registry in front of SQLite.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::types::ToSql;
use rusqlite::{named_params, Connection};
use tracing::{debug, error, warn};

use crate::error::{InsertError, QueryError, SchemaError};
use crate::schema::{ColumnSpec, ColumnType, TableSchema};
use crate::sql;
use crate::value::{Row, Value};

/// Persists simple tabular data into a local SQLite database file.
///
/// The store tracks declared table schemas in memory and validates every
/// operation against them before delegating to the engine. Each operation
/// opens its own short-lived connection; nothing is held across calls.
/// Tables are append-only from this component's perspective: there is no
/// alter, update, or delete operation.
///
/// The registry is rebuilt from explicit [`define_schema`] calls each run;
/// it is never persisted and starts empty regardless of what tables the
/// database file already contains.
///
/// [`define_schema`]: TableStore::define_schema
pub struct TableStore {
    db_path: PathBuf,
    registry: Mutex<HashMap<String, TableSchema>>,
}

impl TableStore {
    /// Create a store backed by the database file at `db_path`.
    ///
    /// No connection is opened until the first operation.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Declared schema of `table`, if it has been defined on this store.
    pub fn schema(&self, table: &str) -> Option<TableSchema> {
        self.lock_registry().get(table).cloned()
    }

    /// Declare a table and create it in the database if missing.
    ///
    /// The declaration is checked locally first (identifier charset,
    /// non-empty unique columns, name not already registered); the engine
    /// and the registry are only touched once every check has passed. A
    /// name that is already registered is rejected, not overwritten.
    pub fn define_schema(
        &self,
        table: &str,
        columns: Vec<ColumnSpec>,
    ) -> Result<(), SchemaError> {
        if !sql::is_valid_identifier(table) {
            return Err(SchemaError::InvalidIdentifier {
                name: table.to_string(),
            });
        }
        if columns.is_empty() {
            return Err(SchemaError::NoColumns {
                table: table.to_string(),
            });
        }
        for (i, col) in columns.iter().enumerate() {
            if !sql::is_valid_identifier(&col.name) {
                return Err(SchemaError::InvalidIdentifier {
                    name: col.name.clone(),
                });
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: table.to_string(),
                    column: col.name.clone(),
                });
            }
        }

        // Held across the engine call so concurrent definers serialize.
        let mut registry = self.lock_registry();
        if registry.contains_key(table) {
            warn!("{table} already exists");
            return Err(SchemaError::AlreadyExists {
                table: table.to_string(),
            });
        }

        let statement = sql::create_table(table, &columns);
        let conn = self.connect()?;
        let result = conn.execute(&statement, [])?;
        debug!("created schema {table}: {result}");

        registry.insert(table.to_string(), TableSchema::new(columns));
        Ok(())
    }

    /// Insert one row, binding each value to its column positionally.
    ///
    /// The value count must match the declared column count; this is
    /// checked before any engine call. Values are bound as parameters, so
    /// embedded quotes or SQL keywords in the data are inert. Returns the
    /// affected-row count the engine reports (expected 1).
    pub fn insert(&self, table: &str, values: Vec<Value>) -> Result<usize, InsertError> {
        let schema = match self.schema(table) {
            Some(schema) => schema,
            None => {
                warn!("{table} does not exist");
                return Err(InsertError::UnknownTable {
                    table: table.to_string(),
                });
            }
        };
        if values.len() != schema.arity() {
            error!(
                "{table} expects {} values, got {}",
                schema.arity(),
                values.len()
            );
            return Err(InsertError::ArityMismatch {
                table: table.to_string(),
                expected: schema.arity(),
                actual: values.len(),
            });
        }

        let statement = sql::insert(table, &schema);
        let keys: Vec<String> = schema
            .columns()
            .iter()
            .map(|c| format!(":{}", c.name))
            .collect();
        let params: Vec<(&str, &dyn ToSql)> = keys
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(|v| v as &dyn ToSql))
            .collect();

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&statement)?;
        let affected = stmt.execute(&params[..])?;
        debug!("insert into {table}: {affected}");
        Ok(affected)
    }

    /// Stream the top `limit` rows of `table`, ordered descending on
    /// `order_by`, through `visit` one row at a time.
    ///
    /// This is the single-pass primitive behind [`query_top`]: rows are
    /// decoded lazily off the engine cursor, and `ControlFlow::Break`
    /// stops the scan early. The cursor and its connection live only for
    /// the duration of this call and are released on every exit path.
    ///
    /// [`query_top`]: TableStore::query_top
    pub fn scan_top<F>(
        &self,
        table: &str,
        order_by: &str,
        limit: u32,
        mut visit: F,
    ) -> Result<(), QueryError>
    where
        F: FnMut(Row) -> ControlFlow<()>,
    {
        let schema = match self.schema(table) {
            Some(schema) => schema,
            None => {
                warn!("{table} does not exist");
                return Err(QueryError::UnknownTable {
                    table: table.to_string(),
                });
            }
        };
        if schema.column(order_by).is_none() {
            warn!("{table} has no column {order_by}");
            return Err(QueryError::UnknownColumn {
                table: table.to_string(),
                column: order_by.to_string(),
            });
        }

        let statement = sql::select_top(table, &schema, order_by);
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&statement)?;
        let mut rows = stmt.query(named_params! { ":limit": limit })?;
        while let Some(record) = rows.next()? {
            let row = decode_row(record, &schema)?;
            if let ControlFlow::Break(()) = visit(row) {
                break;
            }
        }
        Ok(())
    }

    /// Collect the top `limit` rows of `table`, ordered descending on
    /// `order_by`.
    pub fn query_top(
        &self,
        table: &str,
        order_by: &str,
        limit: u32,
    ) -> Result<Vec<Row>, QueryError> {
        let mut out = Vec::new();
        self.scan_top(table, order_by, limit, |row| {
            out.push(row);
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.db_path)
    }

    fn lock_registry(&self) -> MutexGuard<'_, HashMap<String, TableSchema>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn decode_row(record: &rusqlite::Row<'_>, schema: &TableSchema) -> rusqlite::Result<Row> {
    let mut values = Vec::with_capacity(schema.arity());
    for (idx, col) in schema.columns().iter().enumerate() {
        values.push(decode_column(record, idx, col.ty)?);
    }
    Ok(Row(values))
}

/// Decode one column per its declared type.
///
/// Blob columns have no in-process representation; they yield
/// [`Value::Unsupported`] rather than an error.
fn decode_column(
    record: &rusqlite::Row<'_>,
    idx: usize,
    ty: ColumnType,
) -> rusqlite::Result<Value> {
    let value = match ty {
        ColumnType::Integer => Value::Integer(record.get(idx)?),
        ColumnType::Real => Value::Real(record.get(idx)?),
        ColumnType::Text => Value::Text(record.get(idx)?),
        ColumnType::Blob => Value::Unsupported,
    };
    Ok(value)
}

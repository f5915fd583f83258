//! Read-only access to the embedded event store.
//!
//! Every call opens its own SQLite connection, runs exactly one statement and
//! closes the connection again. Dropping the connection on an early return (or
//! when the caller's future is cancelled) releases it as well, so no handle
//! outlives a single query.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqliteRow};
use sqlx::{
    Arguments, Column, ConnectOptions, Connection, Executor, FromRow, Row, SqliteConnection,
    Statement, TypeInfo, ValueRef,
};
use tracing::{debug, warn};

/// Failure reading from the event store. Never retried here.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unable to open event store at {}: {source}", .path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },
    #[error("query failed: {source}")]
    Execute {
        #[source]
        source: sqlx::Error,
    },
}

impl QueryError {
    /// The underlying driver error.
    pub fn driver_error(&self) -> &sqlx::Error {
        match self {
            QueryError::Connect { source, .. } | QueryError::Execute { source } => source,
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(source: sqlx::Error) -> Self {
        Self::Execute { source }
    }
}

/// Positional placeholder value. Identifiers are never passed this way.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

fn bind<'q>(params: &[SqlParam]) -> SqliteArguments<'q> {
    let mut arguments = SqliteArguments::default();
    for param in params {
        match param {
            SqlParam::Integer(value) => arguments.add(*value),
            SqlParam::Text(value) => arguments.add(value.clone()),
        }
    }
    arguments
}

/// A dynamically typed cell from [`QueryEngine::table`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Cell {
    fn decode(row: &SqliteRow, index: usize) -> Result<Self, sqlx::Error> {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Cell::Null);
        }
        let type_name = raw.type_info().name().to_string();

        let cell = match type_name.as_str() {
            "INTEGER" => Cell::Integer(row.try_get::<i64, _>(index)?),
            "REAL" => Cell::Real(row.try_get::<f64, _>(index)?),
            "BLOB" => Cell::Blob(row.try_get::<Vec<u8>, _>(index)?),
            _ => Cell::Text(row.try_get_unchecked::<String, _>(index)?),
        };
        Ok(cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Real(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
            Cell::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// Tabular result with named columns, in statement column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }
}

/// Executes parameterized statements against a single SQLite file.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    path: PathBuf,
}

impl QueryEngine {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, QueryError> {
        SqliteConnectOptions::new()
            .filename(&self.path)
            .read_only(true)
            .connect()
            .await
            .map_err(|source| QueryError::Connect {
                path: self.path.clone(),
                source,
            })
    }

    /// Runs `sql` and decodes every row into `T`. Tuples decode positionally.
    pub async fn rows<T>(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<T>, QueryError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut conn = self.connect().await?;
        let result = sqlx::query_as_with::<_, T, _>(sql, bind(params))
            .fetch_all(&mut conn)
            .await;
        release(conn).await;

        let rows = result?;
        debug!(db = %self.path.display(), rows = rows.len(), "row query executed");
        Ok(rows)
    }

    /// Runs `sql` and returns its rows with the statement's column names.
    pub async fn table(&self, sql: &str, params: &[SqlParam]) -> Result<Table, QueryError> {
        let mut conn = self.connect().await?;
        let result = fetch_table(&mut conn, sql, params).await;
        release(conn).await;

        let table = result?;
        debug!(
            db = %self.path.display(),
            rows = table.rows.len(),
            columns = table.columns.len(),
            "table query executed"
        );
        Ok(table)
    }
}

async fn fetch_table(
    conn: &mut SqliteConnection,
    sql: &str,
    params: &[SqlParam],
) -> Result<Table, sqlx::Error> {
    let statement = (&mut *conn).prepare(sql).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();

    let fetched = statement
        .query_with(bind(params))
        .fetch_all(&mut *conn)
        .await?;

    let rows = fetched
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|index| Cell::decode(row, index))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Table { columns, rows })
}

async fn release(conn: SqliteConnection) {
    if let Err(err) = conn.close().await {
        warn!(error = %err, "failed to close event store connection cleanly");
    }
}

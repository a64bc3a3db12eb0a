use crate::adapters::run_blocking;
use crate::domain::model::{unique_columns, Record, SourceDescriptor, Table};
use crate::domain::ports::Extractor;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_identifier;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Connection that is released on drop, whichever way the scope is left.
struct ScopedConnection {
    conn: Connection,
    open: Arc<AtomicUsize>,
}

impl ScopedConnection {
    fn open(path: &Path, open: Arc<AtomicUsize>) -> Result<Self> {
        if !path.exists() {
            return Err(EtlError::SourceNotFound {
                path: path.display().to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        open.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Opened SQLite connection to {}", path.display());

        Ok(Self { conn, open })
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        // The connection itself closes right after this, when its field drops.
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct SqliteExtractor {
    path: PathBuf,
    table: String,
    open_connections: Arc<AtomicUsize>,
}

impl SqliteExtractor {
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table: table.into(),
            open_connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Connections this extractor currently holds open.
    pub fn open_connections(&self) -> usize {
        self.open_connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for SqliteExtractor {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor::DatabaseTable {
            path: self.path.display().to_string(),
            table: self.table.clone(),
        }
    }

    async fn extract(&self) -> Result<Table> {
        validate_identifier("database.table", &self.table)?;

        let path = self.path.clone();
        let table = self.table.clone();
        let open = Arc::clone(&self.open_connections);
        tracing::debug!("Reading table {} from {}", table, path.display());

        run_blocking(move || {
            let scoped = ScopedConnection::open(&path, open)?;
            read_table(&scoped.conn, &table)
        })
        .await
    }
}

/// Reads every row of `table`. The name must already be a validated
/// identifier.
fn read_table(conn: &Connection, table: &str) -> Result<Table> {
    let sql = format!("SELECT * FROM \"{}\"", table);
    let mut stmt = conn.prepare(&sql)?;
    let columns = unique_columns(stmt.column_names());

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut data = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            data.insert(column.clone(), sql_value(row.get_ref(i)?));
        }
        records.push(Record { data });
    }

    Ok(Table::new(columns, records))
}

fn sql_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(s) => Value::String(String::from_utf8_lossy(s).into_owned()),
        ValueRef::Blob(b) => {
            let mut hex = String::with_capacity(b.len() * 2);
            for byte in b {
                let _ = write!(hex, "{:02x}", byte);
            }
            Value::String(hex)
        }
    }
}

//! SQLite storage for the durable graph store.
//!
//! Connections come out of `open_db*` with foreign keys enforced and the
//! graph schema migrated. `SqliteGraphRepository::try_new` re-reads the same
//! facts through [`inspect_schema`] before accepting a connection: node-delete
//! cascades are carried by `ON DELETE CASCADE`, which needs `foreign_keys=ON`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build.
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },
    /// Edges whose source or target node no longer exists.
    DanglingEdges { count: u64 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "graph schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::DanglingEdges { count } => {
                write!(f, "{count} stored edge(s) reference missing nodes")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Schema facts the graph store depends on, read from one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaStatus {
    /// `PRAGMA user_version`.
    pub version: u32,
    /// `PRAGMA foreign_keys`; the edge cascade needs this on.
    pub foreign_keys: bool,
}

impl SchemaStatus {
    pub fn is_current(&self) -> bool {
        self.version == migrations::latest_version()
    }
}

/// Reads the schema version and foreign-key enforcement of `conn`.
pub fn inspect_schema(conn: &rusqlite::Connection) -> DbResult<SchemaStatus> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let foreign_keys = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get::<_, i64>(0))?;
    Ok(SchemaStatus {
        version,
        foreign_keys: foreign_keys == 1,
    })
}

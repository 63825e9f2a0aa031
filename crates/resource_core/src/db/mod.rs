//! SQLite connection bootstrap and backend error signals.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by resource stores.
//! - Define the backend error type that stores return before translation.
//!
//! # Invariants
//! - Connections handed out have the configured pragmas applied.
//! - Table DDL is owned by callers; this module never creates tables.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;

pub use open::{open_db, open_db_in_memory, open_db_in_memory_with_options, open_db_with_options};

pub type DbResult<T> = Result<T, DbError>;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend failure signal raised by a store client.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Lookup by identity matched zero rows.
    RecordNotFound,
    /// Transaction state does not allow the requested statement.
    ///
    /// `SqliteStore` joins a caller-held transaction instead of nesting, so it
    /// never raises this itself. Other `StoreClient` implementations raise it
    /// for transaction-state failures their backend reports outside SQLite
    /// error messages.
    InvalidTransaction(String),
    /// Resource table does not exist on this connection.
    MissingRequiredTable(&'static str),
    /// Resource table exists but lacks a required column.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::RecordNotFound => write!(f, "record not found"),
            Self::InvalidTransaction(message) => write!(f, "invalid transaction: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::RecordNotFound => None,
            Self::InvalidTransaction(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Connection settings applied at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbOptions {
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
    /// Enables `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            foreign_keys: true,
        }
    }
}

//! Domain error taxonomy for resource operations.
//!
//! # Responsibility
//! - Define the closed set of errors resource managers return.
//! - Translate backend failure signals into that set.
//!
//! # Invariants
//! - Callers never need to inspect backend-specific detail to branch.
//! - Translation logs backend detail once, then discards it.

use crate::db::DbError;
use log::warn;
use rusqlite::ffi;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResourceResult<T> = Result<T, ResourceError>;

/// Closed error set for resource manager operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceError {
    /// Identifier text is not a UUID. Raised before any I/O.
    InvalidFormat,
    /// No record matches the identifier.
    NotFound,
    /// Backend rejected the statement because of transaction state.
    InvalidTransaction,
    /// Duplicate key on insert or update.
    UniqueConstraintViolation,
    /// Any other backend failure.
    InvalidQuery,
    /// The list query builder failed; the store was never reached.
    Internal,
}

impl ResourceError {
    /// Stable machine-readable code, used in log events.
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::NotFound => "not_found",
            Self::InvalidTransaction => "invalid_transaction",
            Self::UniqueConstraintViolation => "unique_constraint",
            Self::InvalidQuery => "invalid_query",
            Self::Internal => "internal",
        }
    }
}

impl Display for ResourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid resource id format"),
            Self::NotFound => write!(f, "resource not found"),
            Self::InvalidTransaction => write!(f, "invalid transaction"),
            Self::UniqueConstraintViolation => write!(f, "unique constraint violation"),
            Self::InvalidQuery => write!(f, "invalid query"),
            Self::Internal => write!(f, "internal error"),
        }
    }
}

impl Error for ResourceError {}

/// Maps a backend failure onto [`ResourceError`].
pub fn translate_store_error(err: &DbError) -> ResourceError {
    let translated = classify(err);
    warn!(
        "event=store_error module=error status=error error_code={} error={}",
        translated.code(),
        err
    );
    translated
}

fn classify(err: &DbError) -> ResourceError {
    match err {
        DbError::RecordNotFound => ResourceError::NotFound,
        DbError::InvalidTransaction(_) => ResourceError::InvalidTransaction,
        DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows) => ResourceError::NotFound,
        DbError::Sqlite(rusqlite::Error::SqliteFailure(failure, message)) => {
            if is_unique_violation(failure) {
                ResourceError::UniqueConstraintViolation
            } else if message.as_deref().is_some_and(is_transaction_state_message) {
                ResourceError::InvalidTransaction
            } else {
                ResourceError::InvalidQuery
            }
        }
        DbError::Sqlite(_)
        | DbError::MissingRequiredTable(_)
        | DbError::MissingRequiredColumn { .. } => ResourceError::InvalidQuery,
    }
}

fn is_unique_violation(failure: &ffi::Error) -> bool {
    failure.code == ffi::ErrorCode::ConstraintViolation
        && (failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
            || failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
}

fn is_transaction_state_message(message: &str) -> bool {
    message.contains("within a transaction") || message.contains("no transaction is active")
}

//! Store client contract consumed by resource managers.
//!
//! # Responsibility
//! - Define the minimal persistence surface a resource manager drives.
//! - Isolate SQL details from manager orchestration.
//!
//! # Invariants
//! - Store methods return backend signals (`DbError`), never domain errors.
//! - `find_by_id` reports zero matches as `DbError::RecordNotFound`.
//! - Every mutating call is atomic on its own.

use crate::db::DbResult;
use crate::id::BINARY_ID_LEN;
use crate::model::Resource;
use crate::query::SelectQuery;
use rusqlite::types::Value;

mod sqlite;

pub use sqlite::SqliteStore;

/// Binary identifier as stored in the `id` column.
pub type BinaryId = [u8; BINARY_ID_LEN];

/// Persistence operations a resource manager needs from its backend.
pub trait StoreClient {
    /// Inserts one fully populated record, envelope included.
    fn insert<R: Resource>(&self, record: &R) -> DbResult<()>;

    /// Loads exactly one record by binary id.
    fn find_by_id<R: Resource>(&self, id: &BinaryId) -> DbResult<R>;

    /// Writes `assignments` to rows matching `id` and advances `updated_at`.
    ///
    /// Returns the number of rows changed.
    fn update_by_id<R: Resource>(
        &self,
        id: &BinaryId,
        assignments: &[(&'static str, Value)],
    ) -> DbResult<usize>;

    /// Deletes the row backing `record`.
    fn delete<R: Resource>(&self, record: &R) -> DbResult<()>;

    /// Executes a list query and collects every matching row.
    fn find_all<R: Resource>(&self, query: &SelectQuery) -> DbResult<Vec<R>>;
}

impl<S: StoreClient + ?Sized> StoreClient for &S {
    fn insert<R: Resource>(&self, record: &R) -> DbResult<()> {
        (**self).insert(record)
    }

    fn find_by_id<R: Resource>(&self, id: &BinaryId) -> DbResult<R> {
        (**self).find_by_id(id)
    }

    fn update_by_id<R: Resource>(
        &self,
        id: &BinaryId,
        assignments: &[(&'static str, Value)],
    ) -> DbResult<usize> {
        (**self).update_by_id::<R>(id, assignments)
    }

    fn delete<R: Resource>(&self, record: &R) -> DbResult<()> {
        (**self).delete(record)
    }

    fn find_all<R: Resource>(&self, query: &SelectQuery) -> DbResult<Vec<R>> {
        (**self).find_all(query)
    }
}

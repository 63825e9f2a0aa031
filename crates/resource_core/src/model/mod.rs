//! Generic resource model.
//!
//! # Responsibility
//! - Define the compile-time contract every managed record type implements.
//! - Define how caller-supplied partial data is copied into a fresh record.
//!
//! # Invariants
//! - `Resource::default()` is the empty instance; its envelope id is nil.
//! - `Resource::column_values` yields exactly the columns in `COLUMNS`,
//!   in the same order.
//! - Envelope columns are owned by the store layer, never by a resource.

pub mod envelope;

use envelope::RecordEnvelope;
use rusqlite::types::Value;
use rusqlite::Row;

/// Record type managed by a [`crate::manager::ResourceManager`].
pub trait Resource: Default {
    /// Table holding rows of this resource.
    const TABLE: &'static str;
    /// Data columns, excluding the envelope columns.
    const COLUMNS: &'static [&'static str];

    fn envelope(&self) -> &RecordEnvelope;
    fn envelope_mut(&mut self) -> &mut RecordEnvelope;

    /// Current values of the data columns, in `COLUMNS` order.
    fn column_values(&self) -> Vec<(&'static str, Value)>;

    /// Decodes data columns from a row. The envelope is filled in by the store.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Lifecycle hook run once per create, before the store write.
    fn before_create(&mut self) {
        self.envelope_mut().before_create();
    }
}

/// Caller-supplied field values for create and update.
pub trait Patch<R: Resource> {
    /// Copies the carried values into `record`.
    fn copy_into(&self, record: &mut R);

    /// Data columns this patch carries a value for. Update writes only these.
    fn present_columns(&self) -> Vec<&'static str>;
}

/// A full record works as a patch carrying every data column.
impl<R: Resource + Clone> Patch<R> for R {
    fn copy_into(&self, record: &mut R) {
        *record = self.clone();
    }

    fn present_columns(&self) -> Vec<&'static str> {
        R::COLUMNS.to_vec()
    }
}

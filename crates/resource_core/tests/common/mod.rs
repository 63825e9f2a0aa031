//! Shared fixtures for resource manager integration tests.
//!
//! - `Widget` / `WidgetPatch`: a small resource with a unique `name` column.
//! - `RecordingStore`: wraps `SqliteStore` and records every store call.
//! - `FaultyStore`: fails every call with a configured backend signal.

#![allow(dead_code)]

use resource_core::db::{open_db_in_memory, DbError, DbResult};
use resource_core::query::{ListQueryBuilder, QueryBuildError, SelectQuery};
use resource_core::store::BinaryId;
use resource_core::{
    FieldFilterBuilder, Patch, RecordEnvelope, Resource, ResourceManager, SortOrder, SqliteStore,
    StoreClient,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::cell::RefCell;

pub const WIDGETS_DDL: &str = "CREATE TABLE widgets (
    id BLOB PRIMARY KEY NOT NULL CHECK (length(id) = 16),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    name TEXT NOT NULL UNIQUE,
    size INTEGER NOT NULL DEFAULT 0,
    note TEXT
);";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Widget {
    pub envelope: RecordEnvelope,
    pub name: String,
    pub size: i64,
    pub note: Option<String>,
}

impl Widget {
    pub fn named(name: &str, size: i64) -> Self {
        Self {
            name: name.to_string(),
            size,
            ..Self::default()
        }
    }
}

impl Resource for Widget {
    const TABLE: &'static str = "widgets";
    const COLUMNS: &'static [&'static str] = &["name", "size", "note"];

    fn envelope(&self) -> &RecordEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut RecordEnvelope {
        &mut self.envelope
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("name", Value::Text(self.name.clone())),
            ("size", Value::Integer(self.size)),
            ("note", self.note.clone().map_or(Value::Null, Value::Text)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            envelope: RecordEnvelope::default(),
            name: row.get("name")?,
            size: row.get("size")?,
            note: row.get("note")?,
        })
    }
}

/// Partial widget payload; `None` means "not provided".
#[derive(Debug, Clone, Default)]
pub struct WidgetPatch {
    pub name: Option<String>,
    pub size: Option<i64>,
    pub note: Option<Option<String>>,
}

impl Patch<Widget> for WidgetPatch {
    fn copy_into(&self, record: &mut Widget) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(size) = self.size {
            record.size = size;
        }
        if let Some(note) = &self.note {
            record.note = note.clone();
        }
    }

    fn present_columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        if self.name.is_some() {
            columns.push("name");
        }
        if self.size.is_some() {
            columns.push("size");
        }
        if self.note.is_some() {
            columns.push("note");
        }
        columns
    }
}

/// Store double that records call names and delegates to SQLite.
pub struct RecordingStore<'conn> {
    inner: SqliteStore<'conn>,
    calls: RefCell<Vec<&'static str>>,
}

impl<'conn> RecordingStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            inner: SqliteStore::new(conn),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn reset(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: &'static str) {
        self.calls.borrow_mut().push(call);
    }
}

impl StoreClient for RecordingStore<'_> {
    fn insert<R: Resource>(&self, record: &R) -> DbResult<()> {
        self.record("insert");
        self.inner.insert(record)
    }

    fn find_by_id<R: Resource>(&self, id: &BinaryId) -> DbResult<R> {
        self.record("find_by_id");
        self.inner.find_by_id(id)
    }

    fn update_by_id<R: Resource>(
        &self,
        id: &BinaryId,
        assignments: &[(&'static str, Value)],
    ) -> DbResult<usize> {
        self.record("update_by_id");
        self.inner.update_by_id::<R>(id, assignments)
    }

    fn delete<R: Resource>(&self, record: &R) -> DbResult<()> {
        self.record("delete");
        self.inner.delete(record)
    }

    fn find_all<R: Resource>(&self, query: &SelectQuery) -> DbResult<Vec<R>> {
        self.record("find_all");
        self.inner.find_all(query)
    }
}

/// Store double failing every call with the signal built by `make_error`.
pub struct FaultyStore {
    pub make_error: fn() -> DbError,
}

impl StoreClient for FaultyStore {
    fn insert<R: Resource>(&self, _record: &R) -> DbResult<()> {
        Err((self.make_error)())
    }

    fn find_by_id<R: Resource>(&self, _id: &BinaryId) -> DbResult<R> {
        Err((self.make_error)())
    }

    fn update_by_id<R: Resource>(
        &self,
        _id: &BinaryId,
        _assignments: &[(&'static str, Value)],
    ) -> DbResult<usize> {
        Err((self.make_error)())
    }

    fn delete<R: Resource>(&self, _record: &R) -> DbResult<()> {
        Err((self.make_error)())
    }

    fn find_all<R: Resource>(&self, _query: &SelectQuery) -> DbResult<Vec<R>> {
        Err((self.make_error)())
    }
}

/// List builder that always fails.
pub struct BrokenListBuilder;

impl ListQueryBuilder for BrokenListBuilder {
    type Params = ();

    fn build_query(&self, _params: &()) -> Result<SelectQuery, QueryBuildError> {
        Err(QueryBuildError::InvalidSort("broken".to_string()))
    }
}

pub type WidgetManager<'conn> = ResourceManager<Widget, RecordingStore<'conn>, FieldFilterBuilder>;

pub fn widget_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(WIDGETS_DDL).unwrap();
    conn
}

pub fn widget_filters() -> FieldFilterBuilder {
    FieldFilterBuilder::new(Widget::COLUMNS)
        .unwrap()
        .with_default_order("created_at", SortOrder::Asc)
        .unwrap()
}

pub fn widget_manager(conn: &Connection) -> WidgetManager<'_> {
    ResourceManager::new(RecordingStore::new(conn), widget_filters())
}

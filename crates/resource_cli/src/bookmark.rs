//! Bookmark resource used by the smoke session.

use resource_core::{
    FieldFilterBuilder, Patch, RecordEnvelope, Resource, ResourceManager, ResourceResult,
    SortOrder, SqliteStore,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};
use std::error::Error;

pub const BOOKMARKS_DDL: &str = "CREATE TABLE bookmarks (
    id BLOB PRIMARY KEY NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    url TEXT NOT NULL UNIQUE,
    tag TEXT NOT NULL,
    title TEXT
);";

#[derive(Debug, Clone, Default)]
pub struct Bookmark {
    pub envelope: RecordEnvelope,
    pub url: String,
    pub tag: String,
    pub title: Option<String>,
}

impl Resource for Bookmark {
    const TABLE: &'static str = "bookmarks";
    const COLUMNS: &'static [&'static str] = &["url", "tag", "title"];

    fn envelope(&self) -> &RecordEnvelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut RecordEnvelope {
        &mut self.envelope
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("url", Value::Text(self.url.clone())),
            ("tag", Value::Text(self.tag.clone())),
            ("title", self.title.clone().map_or(Value::Null, Value::Text)),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            envelope: RecordEnvelope::default(),
            url: row.get("url")?,
            tag: row.get("tag")?,
            title: row.get("title")?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookmarkPatch {
    pub url: Option<String>,
    pub tag: Option<String>,
    pub title: Option<String>,
}

impl Patch<Bookmark> for BookmarkPatch {
    fn copy_into(&self, record: &mut Bookmark) {
        if let Some(url) = &self.url {
            record.url = url.clone();
        }
        if let Some(tag) = &self.tag {
            record.tag = tag.clone();
        }
        if self.title.is_some() {
            record.title = self.title.clone();
        }
    }

    fn present_columns(&self) -> Vec<&'static str> {
        [
            ("url", self.url.is_some()),
            ("tag", self.tag.is_some()),
            ("title", self.title.is_some()),
        ]
        .into_iter()
        .filter_map(|(column, present)| present.then_some(column))
        .collect()
    }
}

type BaseManager<'conn> = ResourceManager<Bookmark, SqliteStore<'conn>, FieldFilterBuilder>;

/// Bookmark manager composed over the generic resource manager.
pub struct BookmarkManager<'conn> {
    base: BaseManager<'conn>,
}

impl<'conn> BookmarkManager<'conn> {
    pub fn new(conn: &'conn Connection) -> Result<Self, Box<dyn Error>> {
        let store = SqliteStore::new(conn);
        store.ensure_schema::<Bookmark>()?;
        let filters = FieldFilterBuilder::new(Bookmark::COLUMNS)?
            .with_default_order("created_at", SortOrder::Asc)?
            .with_page_size(20, 100);

        Ok(Self {
            base: ResourceManager::new(store, filters),
        })
    }

    pub fn base(&self) -> &BaseManager<'conn> {
        &self.base
    }

    /// Creates a bookmark with only url and tag set.
    pub fn add(&self, url: &str, tag: &str) -> ResourceResult<Bookmark> {
        self.base.create(&BookmarkPatch {
            url: Some(url.to_string()),
            tag: Some(tag.to_string()),
            title: None,
        })
    }
}

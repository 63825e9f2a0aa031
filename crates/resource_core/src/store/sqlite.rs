//! SQLite-backed store client.
//!
//! # Responsibility
//! - Render insert/select/update/delete statements for any [`Resource`].
//! - Scope each write in its own transaction unless the caller already
//!   holds one on the same connection.
//!
//! # Invariants
//! - Envelope columns lead every row, followed by `Resource::COLUMNS`.
//! - Ids are bound as 16-byte blobs.
//! - `updated_at` written by updates is never earlier than `created_at`.

use super::{BinaryId, StoreClient};
use crate::db::{DbError, DbResult};
use crate::model::envelope::{now_epoch_ms, RecordEnvelope, ENVELOPE_COLUMNS};
use crate::model::Resource;
use crate::query::SelectQuery;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;

/// Store client over a borrowed SQLite connection.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Verifies that the table and every column `R` needs exist.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `R::TABLE` is absent.
    /// - `MissingRequiredColumn` for the first missing envelope or data column.
    pub fn ensure_schema<R: Resource>(&self) -> DbResult<()> {
        let mut stmt = self.conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
        let present = stmt
            .query_map([R::TABLE], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<String>>>()?;

        if present.is_empty() {
            return Err(DbError::MissingRequiredTable(R::TABLE));
        }

        for column in select_columns::<R>() {
            if !present.contains(column) {
                return Err(DbError::MissingRequiredColumn {
                    table: R::TABLE,
                    column,
                });
            }
        }

        Ok(())
    }

    fn write<T>(&self, op: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> DbResult<T> {
        // A caller-held transaction owns the scope; nesting is not supported
        // by SQLite, so run inside it.
        if !self.conn.is_autocommit() {
            return Ok(op(self.conn)?);
        }

        let tx = self.conn.unchecked_transaction()?;
        let output = op(&*tx)?;
        tx.commit()?;
        Ok(output)
    }
}

impl StoreClient for SqliteStore<'_> {
    fn insert<R: Resource>(&self, record: &R) -> DbResult<()> {
        let envelope = record.envelope();
        let data = record.column_values();

        let mut columns: Vec<&str> = ENVELOPE_COLUMNS.to_vec();
        let mut values = vec![
            Value::Blob(envelope.id.to_binary().to_vec()),
            Value::Integer(envelope.created_at),
            Value::Integer(envelope.updated_at),
        ];
        for (column, value) in data {
            columns.push(column);
            values.push(value);
        }

        let placeholders = (1..=columns.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({placeholders});",
            R::TABLE,
            columns.join(", ")
        );

        self.write(|conn| conn.execute(&sql, params_from_iter(values)))?;
        Ok(())
    }

    fn find_by_id<R: Resource>(&self, id: &BinaryId) -> DbResult<R> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1 LIMIT 1;",
            select_columns::<R>().join(", "),
            R::TABLE
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![&id[..]])?;
        match rows.next()? {
            Some(row) => Ok(decode_row(row)?),
            None => Err(DbError::RecordNotFound),
        }
    }

    fn update_by_id<R: Resource>(
        &self,
        id: &BinaryId,
        assignments: &[(&'static str, Value)],
    ) -> DbResult<usize> {
        let mut set_clauses = Vec::with_capacity(assignments.len() + 1);
        let mut values = Vec::with_capacity(assignments.len() + 2);
        for (column, value) in assignments {
            values.push(value.clone());
            set_clauses.push(format!("{column} = ?{}", values.len()));
        }
        values.push(Value::Integer(now_epoch_ms()));
        set_clauses.push(format!("updated_at = MAX(created_at, ?{})", values.len()));
        values.push(Value::Blob(id.to_vec()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{};",
            R::TABLE,
            set_clauses.join(", "),
            values.len()
        );

        self.write(|conn| conn.execute(&sql, params_from_iter(values)))
    }

    fn delete<R: Resource>(&self, record: &R) -> DbResult<()> {
        let sql = format!("DELETE FROM {} WHERE id = ?1;", R::TABLE);
        let id = record.envelope().id;

        self.write(|conn| conn.execute(&sql, params![id]))?;
        Ok(())
    }

    fn find_all<R: Resource>(&self, query: &SelectQuery) -> DbResult<Vec<R>> {
        let (sql, bind_values) = query.to_select_sql(R::TABLE, &select_columns::<R>());

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(decode_row(row)?);
        }

        Ok(records)
    }
}

fn select_columns<R: Resource>() -> Vec<&'static str> {
    ENVELOPE_COLUMNS
        .iter()
        .chain(R::COLUMNS)
        .copied()
        .collect()
}

fn decode_row<R: Resource>(row: &Row<'_>) -> rusqlite::Result<R> {
    let mut record = R::from_row(row)?;
    *record.envelope_mut() = RecordEnvelope::from_row(row)?;
    Ok(record)
}

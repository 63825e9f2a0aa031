//! Record envelope shared by every persisted resource.
//!
//! # Responsibility
//! - Carry identity and creation/update timestamps for one record.
//! - Run the pre-persist lifecycle hook that assigns those values.
//!
//! # Invariants
//! - `id` is nil before [`RecordEnvelope::before_create`] and non-nil after.
//! - An assigned `id` is never regenerated or overwritten.
//! - `created_at <= updated_at` after the hook runs.

use crate::id::RecordId;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Envelope column names, in the order they lead every resource row.
pub const ENVELOPE_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

/// Identity and timestamps embedded in every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordEnvelope {
    pub id: RecordId,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
}

impl RecordEnvelope {
    /// Envelope with the given id and unset timestamps.
    pub fn with_id(id: RecordId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Pre-persist hook.
    ///
    /// Assigns a generated id when none is present and stamps unset
    /// timestamps with the current time. Calling it again never replaces an
    /// id assigned by an earlier call.
    pub fn before_create(&mut self) {
        if self.id.is_nil() {
            self.id = RecordId::generate();
        }

        let now = now_epoch_ms();
        if self.created_at == 0 {
            self.created_at = now;
        }
        if self.updated_at == 0 || self.updated_at < self.created_at {
            self.updated_at = now.max(self.created_at);
        }
    }

    /// Reads envelope columns from a row selected with [`ENVELOPE_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Current wall clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::RecordEnvelope;
    use crate::id::RecordId;

    #[test]
    fn before_create_assigns_id_and_timestamps() {
        let mut envelope = RecordEnvelope::default();
        assert!(envelope.id.is_nil());

        envelope.before_create();
        assert!(!envelope.id.is_nil());
        assert!(envelope.created_at > 0);
        assert!(envelope.created_at <= envelope.updated_at);
    }

    #[test]
    fn before_create_twice_keeps_first_id() {
        let mut envelope = RecordEnvelope::default();
        envelope.before_create();
        let first = envelope.id;

        envelope.before_create();
        assert_eq!(envelope.id, first);
    }

    #[test]
    fn before_create_keeps_caller_id() {
        let id = RecordId::generate();
        let mut envelope = RecordEnvelope::with_id(id);
        envelope.before_create();
        assert_eq!(envelope.id, id);
    }

    #[test]
    fn before_create_repairs_inverted_timestamps() {
        let mut envelope = RecordEnvelope {
            id: RecordId::nil(),
            created_at: 2_000,
            updated_at: 1_000,
        };
        envelope.before_create();
        assert_eq!(envelope.created_at, 2_000);
        assert!(envelope.updated_at >= envelope.created_at);
    }
}

//! Record identifier codec.
//!
//! # Responsibility
//! - Convert between canonical UUID text and the 16-byte storage form.
//! - Generate fresh identifiers for records that do not carry one yet.
//!
//! # Invariants
//! - Text output is always lowercase hyphenated (36 chars).
//! - Binary form is always exactly 16 bytes and round-trips losslessly.
//! - Parsing never touches the store.
//!
//! # See also
//! - `model::envelope` for the only caller of [`RecordId::generate`].

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Width of the binary identifier column.
pub const BINARY_ID_LEN: usize = 16;

/// Stable 128-bit identifier shared by every persisted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

/// Identifier text or bytes could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdFormatError {
    InvalidText(String),
    InvalidLength(usize),
}

impl Display for IdFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidText(text) => write!(f, "invalid record id text `{text}`"),
            Self::InvalidLength(len) => write!(
                f,
                "invalid record id length {len}; expected {BINARY_ID_LEN} bytes"
            ),
        }
    }
}

impl Error for IdFormatError {}

impl RecordId {
    /// Parses any UUID text form accepted by `uuid` (hyphenated, simple,
    /// braced, urn; any case).
    pub fn parse(text: &str) -> Result<Self, IdFormatError> {
        Uuid::parse_str(text)
            .map(Self)
            .map_err(|_| IdFormatError::InvalidText(text.to_string()))
    }

    /// Generates a new random (v4) identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero identifier carried by records that were never persisted.
    pub const fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    /// Storage representation used for the `id` column.
    pub fn to_binary(&self) -> [u8; BINARY_ID_LEN] {
        *self.0.as_bytes()
    }

    /// Rebuilds an identifier from its storage representation.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, IdFormatError> {
        Uuid::from_slice(bytes)
            .map(Self)
            .map_err(|_| IdFormatError::InvalidLength(bytes.len()))
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl ToSql for RecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(ValueRef::Blob(self.0.as_bytes())))
    }
}

impl FromSql for RecordId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let bytes = value.as_blob()?;
        Self::from_binary(bytes).map_err(|_| FromSqlError::InvalidBlobSize {
            expected_size: BINARY_ID_LEN,
            blob_size: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{IdFormatError, RecordId, BINARY_ID_LEN};

    #[test]
    fn parse_normalizes_to_lowercase_hyphenated() {
        let id = RecordId::parse("9F3B2C1A-0D4E-4F5A-8B6C-7D8E9F0A1B2C").unwrap();
        assert_eq!(id.to_string(), "9f3b2c1a-0d4e-4f5a-8b6c-7d8e9f0a1b2c");

        let simple = RecordId::parse("9f3b2c1a0d4e4f5a8b6c7d8e9f0a1b2c").unwrap();
        assert_eq!(simple, id);
        assert_eq!(simple.to_string().len(), 36);
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", "not-a-uuid", "9f3b2c1a-0d4e-4f5a-8b6c-7d8e9f0a1b2", "zzzzzzzz-0d4e-4f5a-8b6c-7d8e9f0a1b2c"] {
            let err = RecordId::parse(text).unwrap_err();
            assert_eq!(err, IdFormatError::InvalidText(text.to_string()));
        }
    }

    #[test]
    fn binary_form_is_lossless() {
        let id = RecordId::generate();
        let bytes = id.to_binary();
        assert_eq!(bytes.len(), BINARY_ID_LEN);
        assert_eq!(RecordId::from_binary(&bytes).unwrap(), id);
    }

    #[test]
    fn from_binary_rejects_wrong_length() {
        let err = RecordId::from_binary(&[1, 2, 3]).unwrap_err();
        assert_eq!(err, IdFormatError::InvalidLength(3));
    }

    #[test]
    fn generate_never_returns_nil() {
        assert!(RecordId::nil().is_nil());
        assert!(!RecordId::generate().is_nil());
        assert_ne!(RecordId::generate(), RecordId::generate());
    }
}

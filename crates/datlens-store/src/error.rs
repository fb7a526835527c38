//! Error types for record stores.

use thiserror::Error;

use crate::RecordType;

/// Errors that can occur when reading from a record store.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] datlens_common::Error),

    /// A record body exists but does not decode as the requested type.
    #[error("record {id:#010x} does not decode as {record_type}: {reason}")]
    Decode {
        id: u32,
        record_type: RecordType,
        reason: String,
    },

    /// Archive header or entry table is malformed.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Unsupported archive version.
    #[error("unsupported archive version: {0} (expected 1)")]
    UnsupportedVersion(u32),

    /// A stored body does not match its recorded checksum.
    #[error("checksum mismatch for record {id:#010x}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { id: u32, expected: u32, actual: u32 },

    /// Range query with start after end.
    #[error("invalid range: {start:#010x} > {end:#010x}")]
    InvalidRange { start: u32, end: u32 },

    /// The store was opened read-only.
    #[error("store is read-only")]
    ReadOnly,
}

impl Error {
    /// Build a decode error from anything displayable.
    pub fn decode(id: u32, record_type: RecordType, reason: impl ToString) -> Self {
        Self::Decode {
            id,
            record_type,
            reason: reason.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

//! The record store boundary.

use crate::{Record, RecordType, Result, StoreKind};

/// Header of a stored record, returned by range enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordHeader {
    pub id: u32,
    /// Body size in bytes.
    pub size: u32,
}

/// A flat, schema-less key-value store of records addressed by 32-bit id.
///
/// Implementations must support concurrent reads; nothing in this crate
/// mutates a store through this trait.
pub trait RecordStore: Send + Sync {
    /// Which kind of store this is.
    fn kind(&self) -> StoreKind;

    /// Stable identity of the underlying store (path, or a unique label).
    fn identity(&self) -> &str;

    /// Whether the store was opened for writing.
    fn is_writable(&self) -> bool {
        false
    }

    /// Read the record with exactly `id`, decoding it as `expected`.
    ///
    /// Returns `Ok(None)` when no record has this id. A body that does not
    /// decode as `expected` is [`Error::Decode`](crate::Error::Decode).
    fn read_record(&self, id: u32, expected: RecordType) -> Result<Option<Record>>;

    /// Enumerate headers of all records with ids in `start..=end`, ascending.
    ///
    /// Bodies are not decoded.
    fn query_range(&self, start: u32, end: u32) -> Result<Vec<RecordHeader>>;

    /// Number of records in the store.
    fn record_count(&self) -> usize;
}

//! Error types for record resolution.

use datlens_common::FamilyId;
use datlens_store::{RecordType, StoreKind};
use thiserror::Error;

use crate::identifier::{CollectionTag, SessionId};
use crate::lookup::LookupTable;
use crate::range::EntryOrigin;

/// Errors produced while resolving identifiers to records.
///
/// Errors about the addressed target (`UnknownFamily`, `StoreNotFound`, ...)
/// abort a resolution. Errors about one entry or one lookup source are
/// contained by the caller that produced them.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The classifier has no descriptor for this family id.
    #[error("family {0} is not supported: no descriptor for this id")]
    UnknownFamily(FamilyId),

    /// The family exists but has no sub-category with this name.
    #[error("family {family} has no subtype {subtype:?}")]
    UnknownSubtype { family: FamilyId, subtype: String },

    /// The family is known but is not a range family.
    #[error("family {0} is not a range family")]
    NotRangeFamily(FamilyId),

    /// The collection tag is not recognized.
    #[error("unknown collection tag {0:?}")]
    UnknownTag(String),

    /// The collection tag exists but not in this kind of store.
    #[error("collection {tag} is not available in {kind} stores")]
    TagUnavailable { tag: CollectionTag, kind: StoreKind },

    /// The session id does not name an open store.
    #[error("no open store for session {0}")]
    StoreNotFound(SessionId),

    /// The store failed while enumerating a family's id range.
    #[error("listing {origin} failed: {source}")]
    RangeQueryFailed {
        origin: EntryOrigin,
        #[source]
        source: datlens_store::Error,
    },

    /// The record is absent or does not decode as the expected type.
    #[error("failed to load {id:#010x} as {record_type}: {detail}")]
    DecodeFailed {
        id: u32,
        record_type: RecordType,
        detail: String,
    },

    /// An auxiliary lookup table could not be loaded.
    #[error("lookup source {table} unavailable: {detail}")]
    LookupSourceUnavailable { table: LookupTable, detail: String },

    /// A deferred entry's origin has no registered decoder.
    #[error("no decoder registered for {origin} (entry {id:#010x})")]
    ClassificationGap { id: u32, origin: EntryOrigin },
}

impl ResolveError {
    /// Whether the error concerns the addressed target itself rather than
    /// one entry or one auxiliary table.
    pub fn aborts_selection(&self) -> bool {
        matches!(
            self,
            Self::UnknownFamily(_)
                | Self::UnknownSubtype { .. }
                | Self::NotRangeFamily(_)
                | Self::UnknownTag(_)
                | Self::TagUnavailable { .. }
                | Self::StoreNotFound(_)
        )
    }
}

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

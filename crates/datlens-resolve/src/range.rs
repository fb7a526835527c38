//! Range listing.
//!
//! A range listing enumerates record headers only. No body is decoded here;
//! entries come back as placeholders for [`crate::materialize`] to fill in
//! on selection.

use std::fmt;
use std::sync::Arc;

use datlens_common::FamilyId;
use datlens_store::{Record, RecordHeader, RecordType};

use crate::classifier::{self, decoder_for};
use crate::error::{ResolveError, Result};
use crate::identifier::CollectionTag;
use crate::registry::Session;

/// Where a deferred entry was listed from. Selects its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value", rename_all = "lowercase"))]
pub enum EntryOrigin {
    Family(FamilyId),
    Tag(CollectionTag),
}

impl EntryOrigin {
    /// Decoder for entries of this origin, if one is registered.
    pub fn decoder(&self) -> Option<RecordType> {
        match self {
            Self::Family(family) => decoder_for(*family),
            Self::Tag(tag) => tag.decoder(),
        }
    }
}

impl fmt::Display for EntryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family(family) => write!(f, "family {}", family),
            Self::Tag(tag) => write!(f, "collection {}", tag),
        }
    }
}

/// One row of a range listing.
///
/// Starts as a placeholder. Once materialized it keeps its record for the
/// rest of its life.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RangeEntry {
    id: u32,
    label: String,
    size: u32,
    origin: EntryOrigin,
    materialized: Option<Arc<Record>>,
}

impl RangeEntry {
    /// A placeholder for a listed header.
    pub fn placeholder(header: RecordHeader, origin: EntryOrigin) -> Self {
        Self {
            id: header.id,
            label: format!("0x{:08X}", header.id),
            size: header.size,
            origin,
            materialized: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Body size reported by the store.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn origin(&self) -> EntryOrigin {
        self.origin
    }

    /// The decoded record, once materialized.
    pub fn materialized(&self) -> Option<&Arc<Record>> {
        self.materialized.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.materialized.is_none()
    }

    /// Cache a decoded record. An entry that already has one keeps it.
    pub(crate) fn fill(&mut self, record: Arc<Record>) -> Arc<Record> {
        self.materialized.get_or_insert(record).clone()
    }
}

/// List the members of a range family as placeholders, ascending by id.
///
/// Issues exactly one range query. A store failure is returned as
/// [`ResolveError::RangeQueryFailed`] for this family only.
pub fn resolve_range(session: &Session, family_id: FamilyId) -> Result<Vec<RangeEntry>> {
    let descriptor = classifier::classify(family_id).ok_or(ResolveError::UnknownFamily(family_id))?;
    let spec = descriptor.range().ok_or(ResolveError::NotRangeFamily(family_id))?;

    let (start, end) = (family_id.range_start(spec.mask), family_id.range_end(spec.mask));
    let origin = EntryOrigin::Family(family_id);
    let headers = query(session, origin, start, end)?;

    let entries = collect(headers, origin, |id| family_id.contains(spec.mask, id));
    tracing::debug!(
        session = %session.id(),
        family = %family_id,
        name = descriptor.name,
        entries = entries.len(),
        "listed range family"
    );
    Ok(entries)
}

/// List a cell collection: every record whose low 16 bits carry the tag's marker.
pub fn list_tag(session: &Session, tag: CollectionTag) -> Result<Vec<RangeEntry>> {
    let marker = match tag.cell_marker() {
        Some(marker) if session.kind() == tag.store_kind() => marker,
        _ => {
            return Err(ResolveError::TagUnavailable {
                tag,
                kind: session.kind(),
            })
        }
    };

    let origin = EntryOrigin::Tag(tag);
    let headers = query(session, origin, 0, u32::MAX)?;
    let entries = collect(headers, origin, |id| id & 0xFFFF == marker as u32);
    tracing::debug!(session = %session.id(), %tag, entries = entries.len(), "listed cell collection");
    Ok(entries)
}

fn query(session: &Session, origin: EntryOrigin, start: u32, end: u32) -> Result<Vec<RecordHeader>> {
    session.store().query_range(start, end).map_err(|source| {
        tracing::warn!(session = %session.id(), %origin, error = %source, "range query failed");
        ResolveError::RangeQueryFailed { origin, source }
    })
}

/// Keep headers inside the bounds, order them and drop duplicate ids.
fn collect(
    mut headers: Vec<RecordHeader>,
    origin: EntryOrigin,
    in_bounds: impl Fn(u32) -> bool,
) -> Vec<RangeEntry> {
    headers.retain(|h| in_bounds(h.id));
    headers.sort_unstable_by_key(|h| h.id);
    headers.dedup_by_key(|h| h.id);
    headers
        .into_iter()
        .map(|header| RangeEntry::placeholder(header, origin))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::family;
    use crate::registry::StoreRegistry;
    use datlens_store::{MemoryStore, RecordStore, StoreKind};

    fn session_with(store: MemoryStore) -> Session {
        let registry = StoreRegistry::new();
        let id = registry.register_store(Arc::new(store));
        registry.find(&id).unwrap()
    }

    fn raw(store: &MemoryStore, id: u32) {
        store.insert_raw(id, id.to_le_bytes().to_vec()).unwrap();
    }

    #[test]
    fn test_range_stays_inside_family() {
        let store = MemoryStore::new(StoreKind::Portal);
        for id in [0x04FF_FFFF, 0x0500_0003, 0x0500_0001, 0x05FF_FFFF, 0x0600_0000] {
            raw(&store, id);
        }
        let session = session_with(store);

        let entries = resolve_range(&session, family::SURFACE_TEXTURE).unwrap();
        let ids: Vec<_> = entries.iter().map(RangeEntry::id).collect();
        assert_eq!(ids, vec![0x0500_0001, 0x0500_0003, 0x05FF_FFFF]);
        assert!(entries.iter().all(RangeEntry::is_placeholder));
        assert_eq!(entries[0].label(), "0x05000001");
        assert_eq!(entries[0].size(), 4);
    }

    #[test]
    fn test_narrow_family_mask() {
        let store = MemoryStore::new(StoreKind::Portal);
        for id in [0x0E00_000E, 0x0E01_0001, 0x0E01_FFFF, 0x0E02_0000] {
            raw(&store, id);
        }
        let session = session_with(store);

        let ids: Vec<_> = resolve_range(&session, family::QUALITY_FILTER)
            .unwrap()
            .iter()
            .map(RangeEntry::id)
            .collect();
        assert_eq!(ids, vec![0x0E01_0001, 0x0E01_FFFF]);
    }

    #[test]
    fn test_non_range_families_rejected() {
        let session = session_with(MemoryStore::new(StoreKind::Portal));
        assert!(matches!(
            resolve_range(&session, family::SPELL_TABLE),
            Err(ResolveError::NotRangeFamily(_))
        ));
        assert!(matches!(
            resolve_range(&session, FamilyId::new(0x0700_0000)),
            Err(ResolveError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_landblock_listing_uses_marker() {
        let store = MemoryStore::new(StoreKind::Cell);
        for id in [0xA9B4_FFFF, 0xA9B4_FFFE, 0xA9B4_0100, 0x0101_FFFF] {
            raw(&store, id);
        }
        let session = session_with(store);

        let landblocks: Vec<_> = list_tag(&session, CollectionTag::Landblocks)
            .unwrap()
            .iter()
            .map(RangeEntry::id)
            .collect();
        assert_eq!(landblocks, vec![0x0101_FFFF, 0xA9B4_FFFF]);

        let info = list_tag(&session, CollectionTag::LandblockInfo).unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].origin(), EntryOrigin::Tag(CollectionTag::LandblockInfo));
    }

    #[test]
    fn test_cell_tag_on_portal_store() {
        let session = session_with(MemoryStore::new(StoreKind::Portal));
        assert!(matches!(
            list_tag(&session, CollectionTag::Landblocks),
            Err(ResolveError::TagUnavailable { .. })
        ));
    }

    #[test]
    fn test_fill_never_replaces() {
        let header = RecordHeader { id: 7, size: 0 };
        let mut entry = RangeEntry::placeholder(header, EntryOrigin::Family(family::GFX_OBJ));
        let store = MemoryStore::new(StoreKind::Portal);
        raw(&store, 7);
        let record = Arc::new(store.read_record(7, RecordType::GfxObj).unwrap().unwrap());
        let other = Arc::new(store.read_record(7, RecordType::Setup).unwrap().unwrap());

        entry.fill(record.clone());
        let kept = entry.fill(other);
        assert!(Arc::ptr_eq(&kept, &record));
    }
}

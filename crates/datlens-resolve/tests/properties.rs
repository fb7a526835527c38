//! Property tests for range listing.

use std::collections::BTreeSet;
use std::sync::Arc;

use datlens_resolve::{classifier, resolve_range, FamilyDescriptor, StoreRegistry};
use datlens_store::{MemoryStore, Record, RecordHeader, RecordStore, RecordType, Result, StoreKind};
use proptest::prelude::*;

/// A store whose range queries ignore their bounds and return headers
/// unsorted and duplicated.
struct SloppyStore {
    identity: String,
    headers: Vec<RecordHeader>,
}

impl RecordStore for SloppyStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Portal
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn read_record(&self, _id: u32, _expected: RecordType) -> Result<Option<Record>> {
        Ok(None)
    }

    fn query_range(&self, _start: u32, _end: u32) -> Result<Vec<RecordHeader>> {
        let mut headers = self.headers.clone();
        headers.extend(self.headers.iter().rev().copied());
        Ok(headers)
    }

    fn record_count(&self) -> usize {
        self.headers.len()
    }
}

fn range_families() -> Vec<&'static FamilyDescriptor> {
    classifier::families().iter().filter(|d| d.range().is_some()).collect()
}

fn family_strategy() -> impl Strategy<Value = &'static FamilyDescriptor> {
    proptest::sample::select(range_families())
}

/// Ids concentrated around family boundaries.
fn id_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        any::<u32>(),
        (any::<u8>(), 0u32..16).prop_map(|(top, low)| (u32::from(top) << 24) | low),
        (any::<u8>(), 0u32..16).prop_map(|(top, low)| (u32::from(top) << 24) | (0x00FF_FFFF - low)),
        (0u32..0x2_0000).prop_map(|low| 0x0E00_0000 | low),
    ]
}

proptest! {
    #[test]
    fn listing_is_bounded_and_ascending(
        descriptor in family_strategy(),
        ids in proptest::collection::vec(id_strategy(), 0..64),
    ) {
        let registry = StoreRegistry::new();
        let store = SloppyStore {
            identity: "sloppy".to_string(),
            headers: ids.iter().map(|&id| RecordHeader { id, size: 4 }).collect(),
        };
        let session = registry.find(&registry.register_store(Arc::new(store))).unwrap();

        let family = descriptor.family_id;
        let mask = descriptor.range().unwrap().mask;
        let entries = resolve_range(&session, family).unwrap();

        for entry in &entries {
            prop_assert!(entry.id() >= family.range_start(mask));
            prop_assert!(entry.id() <= family.range_end(mask));
            prop_assert!(entry.is_placeholder());
        }
        for pair in entries.windows(2) {
            prop_assert!(pair[0].id() < pair[1].id());
        }

        let expected: BTreeSet<u32> = ids.into_iter().filter(|&id| family.contains(mask, id)).collect();
        let listed: BTreeSet<u32> = entries.iter().map(|e| e.id()).collect();
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn memory_store_listing_matches_contents(
        descriptor in family_strategy(),
        ids in proptest::collection::btree_set(id_strategy(), 0..64),
    ) {
        let store = MemoryStore::new(StoreKind::Portal);
        for &id in &ids {
            store.insert_raw(id, id.to_le_bytes().to_vec()).unwrap();
        }
        let registry = StoreRegistry::new();
        let session = registry.find(&registry.register_store(Arc::new(store))).unwrap();

        let family = descriptor.family_id;
        let mask = descriptor.range().unwrap().mask;
        let listed: Vec<u32> = resolve_range(&session, family).unwrap().iter().map(|e| e.id()).collect();
        let expected: Vec<u32> = ids.into_iter().filter(|&id| family.contains(mask, id)).collect();
        prop_assert_eq!(listed, expected);
    }
}

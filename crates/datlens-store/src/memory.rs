//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::records::{pack, Pack};
use crate::{Error, Record, RecordHeader, RecordStore, RecordType, Result, StoreKind};

static NEXT_ANONYMOUS: AtomicU64 = AtomicU64::new(1);

/// A writable store holding raw record bodies in id order.
///
/// # Example
///
/// ```
/// use datlens_store::{MemoryStore, RecordStore, RecordType, StoreKind};
/// use datlens_store::records::Palette;
///
/// let store = MemoryStore::new(StoreKind::Portal);
/// store.insert(&Palette { id: 0x0400_0001, colors: vec![0xFF00_0000] })?;
///
/// let record = store.read_record(0x0400_0001, RecordType::Palette)?;
/// assert!(record.is_some());
/// assert!(store.read_record(0x0400_0002, RecordType::Palette)?.is_none());
/// # Ok::<(), datlens_store::Error>(())
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    kind: StoreKind,
    identity: String,
    writable: bool,
    bodies: RwLock<BTreeMap<u32, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty writable store with a process-unique identity.
    pub fn new(kind: StoreKind) -> Self {
        let serial = NEXT_ANONYMOUS.fetch_add(1, Ordering::Relaxed);
        Self::with_identity(kind, format!("memory:{}:{}", kind, serial))
    }

    /// Create an empty writable store with an explicit identity.
    pub fn with_identity(kind: StoreKind, identity: impl Into<String>) -> Self {
        Self {
            kind,
            identity: identity.into(),
            writable: true,
            bodies: RwLock::new(BTreeMap::new()),
        }
    }

    /// Mark the store read-only. Further inserts fail with [`Error::ReadOnly`].
    pub fn into_read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Encode and store a typed record, replacing any body with the same id.
    pub fn insert<T: Pack + ?Sized>(&self, record: &T) -> Result<()> {
        self.insert_raw(record.id(), pack(record))
    }

    /// Store a raw body under `id`.
    pub fn insert_raw(&self, id: u32, body: Vec<u8>) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }
        self.bodies.write().insert(id, body);
        Ok(())
    }

    /// Remove a record. Returns whether it existed.
    pub fn remove(&self, id: u32) -> Result<bool> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }
        Ok(self.bodies.write().remove(&id).is_some())
    }

    /// Copy every raw body, in id order.
    pub fn bodies(&self) -> Vec<(u32, Vec<u8>)> {
        self.bodies
            .read()
            .iter()
            .map(|(id, body)| (*id, body.clone()))
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn is_writable(&self) -> bool {
        self.writable
    }

    fn read_record(&self, id: u32, expected: RecordType) -> Result<Option<Record>> {
        let bodies = self.bodies.read();
        match bodies.get(&id) {
            Some(body) => Record::decode(expected, id, body).map(Some),
            None => Ok(None),
        }
    }

    fn query_range(&self, start: u32, end: u32) -> Result<Vec<RecordHeader>> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(self
            .bodies
            .read()
            .range(start..=end)
            .map(|(id, body)| RecordHeader {
                id: *id,
                size: body.len() as u32,
            })
            .collect())
    }

    fn record_count(&self) -> usize {
        self.bodies.read().len()
    }
}

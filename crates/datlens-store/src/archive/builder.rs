//! Archive writer.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use datlens_common::{crc, BinaryWriter};
use zerocopy::IntoBytes;

use super::header::{ArchiveEntry, ArchiveHeader};
use super::ArchiveStore;
use crate::records::{pack, Pack};
use crate::{MemoryStore, RecordStore, Result, StoreKind};

/// Builder for archive files.
///
/// # Example
///
/// ```
/// use datlens_store::{ArchiveBuilder, ArchiveStore, RecordStore, StoreKind};
/// use datlens_store::records::LanguageString;
///
/// let mut builder = ArchiveBuilder::new(StoreKind::Portal);
/// builder.add(&LanguageString { id: 0x3100_0001, text: "Hello".into() });
///
/// let store = ArchiveStore::from_bytes(builder.to_bytes(), "inline")?;
/// assert_eq!(store.record_count(), 1);
/// # Ok::<(), datlens_store::Error>(())
/// ```
#[derive(Debug)]
pub struct ArchiveBuilder {
    kind: StoreKind,
    bodies: BTreeMap<u32, Vec<u8>>,
}

impl ArchiveBuilder {
    /// Create an empty builder.
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            bodies: BTreeMap::new(),
        }
    }

    /// Seed a builder with every record of a memory store.
    pub fn from_store(store: &MemoryStore) -> Self {
        let mut builder = Self::new(store.kind());
        builder.bodies.extend(store.bodies());
        builder
    }

    /// Add a typed record, replacing any body with the same id.
    pub fn add<T: Pack + ?Sized>(&mut self, record: &T) -> &mut Self {
        self.bodies.insert(record.id(), pack(record));
        self
    }

    /// Add a raw body, replacing any body with the same id.
    pub fn add_raw(&mut self, id: u32, body: Vec<u8>) -> &mut Self {
        self.bodies.insert(id, body);
        self
    }

    /// Copy the checked bodies of every record of `store` with an id in
    /// `start..=end`. Returns how many bodies were copied.
    pub fn copy_range(&mut self, store: &ArchiveStore, start: u32, end: u32) -> Result<usize> {
        let headers = store.query_range(start, end)?;
        for header in &headers {
            if let Some(body) = store.raw_body(header.id)? {
                self.bodies.insert(header.id, body.to_vec());
            }
        }
        Ok(headers.len())
    }

    /// Number of bodies staged so far.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Serialize the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        let header = ArchiveHeader {
            magic: ArchiveHeader::MAGIC,
            version: ArchiveHeader::VERSION,
            kind: self.kind as u32,
            entry_count: self.bodies.len() as u32,
        };

        let mut writer = BinaryWriter::new();
        writer.write_bytes(header.as_bytes());

        let mut offset = (ArchiveHeader::SIZE + self.bodies.len() * ArchiveEntry::SIZE) as u64;
        for (&id, body) in &self.bodies {
            let entry = ArchiveEntry {
                id,
                size: body.len() as u32,
                offset,
                checksum: crc::hash_bytes(body),
            };
            writer.write_bytes(entry.as_bytes());
            offset += body.len() as u64;
        }

        for body in self.bodies.values() {
            writer.write_bytes(body);
        }
        writer.into_inner()
    }

    /// Write the archive to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}

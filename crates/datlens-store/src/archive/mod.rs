//! Memory-mapped, read-only archive store.
//!
//! Layout:
//! - [`ArchiveHeader`] (16 bytes)
//! - `entry_count` × [`ArchiveEntry`] (20 bytes each), strictly ascending by id
//! - record bodies, each covered by its entry's CRC32C

mod builder;
mod header;

pub use builder::ArchiveBuilder;
pub use header::{ArchiveEntry, ArchiveHeader};

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use datlens_common::{crc, BinaryReader};
use memmap2::Mmap;

use crate::{Error, Record, RecordHeader, RecordStore, RecordType, Result, StoreKind};

/// Bytes backing an archive.
enum Backing {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Deref for Backing {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Backing::Mapped(mmap) => mmap,
            Backing::Owned(bytes) => bytes,
        }
    }
}

/// A read-only record store backed by an archive file.
///
/// Only the header and entry table are parsed on open; bodies are checked
/// and decoded per read.
pub struct ArchiveStore {
    data: Backing,
    identity: String,
    kind: StoreKind,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveStore {
    /// Open and memory-map an archive file.
    ///
    /// The identity is the canonicalized path, so opening the same file twice
    /// yields the same identity.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // Safety: the archive is opened read-only; concurrent truncation by
        // another process is outside what this store supports.
        let mmap = unsafe { Mmap::map(&file)? };

        let identity = std::fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();

        Self::parse(Backing::Mapped(mmap), identity)
    }

    /// Parse an archive held in memory.
    pub fn from_bytes(bytes: Vec<u8>, identity: impl Into<String>) -> Result<Self> {
        Self::parse(Backing::Owned(bytes), identity.into())
    }

    fn parse(data: Backing, identity: String) -> Result<Self> {
        let mut reader = BinaryReader::new(&data);
        let header: ArchiveHeader = reader.read_struct()?;

        if header.magic != ArchiveHeader::MAGIC {
            return Err(datlens_common::Error::InvalidMagic {
                expected: ArchiveHeader::MAGIC.to_vec(),
                actual: header.magic.to_vec(),
            }
            .into());
        }
        let version = header.version;
        if version != ArchiveHeader::VERSION {
            return Err(Error::UnsupportedVersion(version));
        }
        let raw_kind = header.kind;
        let kind = StoreKind::from_u32(raw_kind)
            .ok_or_else(|| Error::InvalidArchive(format!("unknown store kind {}", raw_kind)))?;

        let entry_count = header.entry_count as usize;
        if entry_count.saturating_mul(ArchiveEntry::SIZE) > reader.remaining() {
            return Err(Error::InvalidArchive(format!(
                "entry table of {} entries exceeds file size",
                entry_count
            )));
        }

        let mut entries = Vec::with_capacity(entry_count);
        let mut previous: Option<u32> = None;
        for _ in 0..entry_count {
            let entry: ArchiveEntry = reader.read_struct()?;
            let (id, offset, size) = (entry.id, entry.offset, entry.size);

            if previous.is_some_and(|p| p >= id) {
                return Err(Error::InvalidArchive(format!(
                    "entry {:#010x} out of order",
                    id
                )));
            }
            let end = offset.checked_add(size as u64);
            if end.map_or(true, |end| end > data.len() as u64) {
                return Err(Error::InvalidArchive(format!(
                    "body of {:#010x} lies outside the file",
                    id
                )));
            }

            previous = Some(id);
            entries.push(entry);
        }

        tracing::debug!(identity = %identity, %kind, entries = entries.len(), "opened archive");

        Ok(Self {
            data,
            identity,
            kind,
            entries,
        })
    }

    fn find(&self, id: u32) -> Option<&ArchiveEntry> {
        self.entries
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Raw body bytes of the record with exactly `id`, checksum verified.
    pub fn raw_body(&self, id: u32) -> Result<Option<&[u8]>> {
        match self.find(id) {
            Some(entry) => self.body(entry).map(Some),
            None => Ok(None),
        }
    }

    /// Checked body bytes for an entry.
    fn body(&self, entry: &ArchiveEntry) -> Result<&[u8]> {
        let (id, offset, size, expected) = (entry.id, entry.offset, entry.size, entry.checksum);
        let start = offset as usize;
        let body = &self.data[start..start + size as usize];

        let actual = crc::hash_bytes(body);
        if actual != expected {
            return Err(Error::ChecksumMismatch {
                id,
                expected,
                actual,
            });
        }
        Ok(body)
    }
}

impl RecordStore for ArchiveStore {
    fn kind(&self) -> StoreKind {
        self.kind
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn read_record(&self, id: u32, expected: RecordType) -> Result<Option<Record>> {
        let Some(entry) = self.find(id) else {
            return Ok(None);
        };
        let body = self.body(entry)?;
        Record::decode(expected, id, body).map(Some)
    }

    fn query_range(&self, start: u32, end: u32) -> Result<Vec<RecordHeader>> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        let first = self.entries.partition_point(|e| e.id < start);
        let last = self.entries.partition_point(|e| e.id <= end);
        Ok(self.entries[first..last]
            .iter()
            .map(|e| RecordHeader {
                id: e.id,
                size: e.size,
            })
            .collect())
    }

    fn record_count(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for ArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveStore")
            .field("identity", &self.identity)
            .field("kind", &self.kind)
            .field("entries", &self.entries.len())
            .finish()
    }
}

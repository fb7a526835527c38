//! On-disk archive structures.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Archive file header.
///
/// Followed by `entry_count` [`ArchiveEntry`] values sorted by id, then the
/// record bodies.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ArchiveHeader {
    /// Always [`ArchiveHeader::MAGIC`].
    pub magic: [u8; 4],
    /// Format version.
    pub version: u32,
    /// [`StoreKind`](crate::StoreKind) discriminator.
    pub kind: u32,
    /// Number of entries in the table.
    pub entry_count: u32,
}

impl ArchiveHeader {
    /// Archive signature bytes.
    pub const MAGIC: [u8; 4] = *b"DLRA";

    /// Current format version.
    pub const VERSION: u32 = 1;

    /// Header size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// One entry in the archive's id-sorted table.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct ArchiveEntry {
    /// Record id.
    pub id: u32,
    /// Body size in bytes.
    pub size: u32,
    /// Absolute offset of the body.
    pub offset: u64,
    /// CRC32C of the body.
    pub checksum: u32,
}

impl ArchiveEntry {
    /// Entry size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

//! Record store boundary for legacy game asset databases.
//!
//! A store is a flat key-value space of records addressed by 32-bit id. It
//! offers exactly two reads: fetch one record by exact id (decoded as a type
//! the caller names), and enumerate record headers in an id range. There is
//! no schema and no query language; everything above that is built by the
//! resolution engine.
//!
//! # Quick Start
//!
//! ```no_run
//! use datlens_store::{ArchiveStore, RecordStore, RecordType};
//!
//! let store = ArchiveStore::open("client_portal.dla")?;
//!
//! // List every palette without decoding any body
//! for header in store.query_range(0x0400_0000, 0x04FF_FFFF)? {
//!     println!("{:#010x} ({} bytes)", header.id, header.size);
//! }
//!
//! // Decode one of them
//! if let Some(record) = store.read_record(0x0400_0001, RecordType::Palette)? {
//!     println!("{:?}", record);
//! }
//! # Ok::<(), datlens_store::Error>(())
//! ```
//!
//! # Stores
//!
//! - [`MemoryStore`]: writable, in-memory; used for fixtures and scratch data
//! - [`ArchiveStore`]: read-only, memory-mapped archive file, built with [`ArchiveBuilder`]

mod archive;
mod error;
mod kind;
mod memory;
mod record_type;
mod store;

pub mod records;

pub use archive::{ArchiveBuilder, ArchiveEntry, ArchiveHeader, ArchiveStore};
pub use error::{Error, Result};
pub use kind::StoreKind;
pub use memory::MemoryStore;
pub use record_type::RecordType;
pub use records::Record;
pub use store::{RecordHeader, RecordStore};

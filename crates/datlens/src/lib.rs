//! Datlens - record browsing for legacy game asset databases.
//!
//! This crate provides a unified interface to the datlens crates.
//!
//! # Crates
//!
//! - [`datlens_common`] - Binary reading/writing, CRC32C, family ids
//! - [`datlens_store`] - Record stores (in-memory and archive) and typed records
//! - [`datlens_resolve`] - Identifier resolution, lazy loading, filtering and lookups
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use datlens::prelude::*;
//!
//! let registry = Arc::new(StoreRegistry::new());
//! let session = registry.register_store(Arc::new(ArchiveStore::open("client_portal.dla")?));
//!
//! let resolver = Resolver::new(registry);
//! let mut context = SelectionContext::new();
//! resolver.resolve(&NavigationId::tag("spells", session), &mut context)?;
//!
//! let result = context.apply_filter(FilterState::name("bolt"));
//! println!("{}", result.status_message);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use datlens_common as common;
pub use datlens_resolve as resolve;
pub use datlens_store as store;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use datlens_common::{BinaryReader, BinaryWriter, FamilyId};
    pub use datlens_resolve::{
        CollectionTag, FilterState, LookupContext, LookupTable, NavigationId, Resolution, ResolvedContent, Resolver,
        SelectionContext, SessionId, StoreRegistry,
    };
    pub use datlens_store::{ArchiveBuilder, ArchiveStore, MemoryStore, Record, RecordStore, RecordType, StoreKind};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

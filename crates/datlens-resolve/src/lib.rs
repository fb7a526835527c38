//! Record resolution and cross-reference engine.
//!
//! The backing stores expose two primitives: read one record by exact id,
//! and enumerate record headers in an id range. This crate builds
//! navigation on top of them:
//!
//! - [`classifier`]: which families exist, how their records are organized,
//!   and which decoder reads each range family's members
//! - [`range`]: header-only listing of range families and cell collections
//! - [`materialize`]: on-demand decoding of listed entries, cached per entry
//! - [`filter`]: predicate projection over the spell catalog
//! - [`lookup`]: best-effort id to name tables for rendering references
//! - [`registry`]: open stores and their session ids
//! - [`Resolver`]: identifier in, typed content out
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use datlens_resolve::{classifier::family, NavigationId, Resolver, SelectionContext, StoreRegistry};
//! use datlens_store::records::SurfaceTexture;
//! use datlens_store::{MemoryStore, StoreKind};
//!
//! let store = MemoryStore::new(StoreKind::Portal);
//! store.insert(&SurfaceTexture { id: 0x0500_0001, texture_type: 1, textures: vec![0x0600_0001] })?;
//!
//! let registry = Arc::new(StoreRegistry::new());
//! let session = registry.register_store(Arc::new(store));
//! let resolver = Resolver::new(registry);
//! let mut context = SelectionContext::new();
//!
//! let mut listing = resolver.resolve(&NavigationId::family(family::SURFACE_TEXTURE, session.clone()), &mut context)?;
//! let row = listing.row_for_id_mut(0x0500_0001).unwrap();
//! assert!(row.entry().unwrap().is_placeholder());
//!
//! let record = resolver.materialize_row(&session, row)?.unwrap();
//! assert_eq!(record.id(), 0x0500_0001);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod detail;
mod error;
pub mod filter;
mod identifier;
pub mod lookup;
pub mod materialize;
pub mod range;
pub mod registry;
mod resolver;
mod selection;
mod worker;

pub use classifier::{classify, FamilyCategory, FamilyDescriptor, RangeSpec};
pub use detail::{describe, describe_item, DetailField};
pub use error::{ResolveError, Result};
pub use filter::{FilterEngine, FilterState, FilteredItem, FilteredResult};
pub use identifier::{CollectionTag, FamilyRef, NavigationId, SessionId, TagRef};
pub use lookup::{build_context, LookupContext, LookupSources, LookupTable};
pub use materialize::{materialize, materialize_all, MaterializeReport};
pub use range::{list_tag, resolve_range, EntryOrigin, RangeEntry};
pub use registry::{Session, StoreRegistry};
pub use resolver::{Item, Resolution, ResolvedContent, Resolver, Row, RowKey, RowValue};
pub use selection::SelectionContext;
pub use worker::{ResolveEvent, ResolveWorker, Ticket};

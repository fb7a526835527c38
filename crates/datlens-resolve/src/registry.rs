//! Open store sessions.

use std::fmt;
use std::sync::Arc;

use datlens_common::crc;
use datlens_store::{RecordStore, StoreKind};
use parking_lot::RwLock;

use crate::identifier::SessionId;

/// One open store.
///
/// Cheap to clone; clones share the store handle.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    store: Arc<dyn RecordStore>,
    kind: StoreKind,
    writable: bool,
}

impl Session {
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn identity(&self) -> &str {
        self.store.identity()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("identity", &self.store.identity())
            .field("kind", &self.kind)
            .field("writable", &self.writable)
            .finish()
    }
}

/// The set of currently open stores.
///
/// Session ids are derived from the store's identity, so registering the
/// same store again yields the id it already has. Lookups may run
/// concurrently with each other.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    sessions: RwLock<Vec<Session>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open store and return its session id.
    pub fn register(&self, store: Arc<dyn RecordStore>, kind: StoreKind, writable: bool) -> SessionId {
        let mut sessions = self.sessions.write();
        let identity = store.identity().to_string();

        if let Some(existing) = sessions.iter().find(|s| s.identity() == identity) {
            return existing.id.clone();
        }

        let base = format!("{}-{:08x}", kind, crc::hash_str(&identity));
        let mut id = SessionId::new(base.clone());
        let mut suffix = 1;
        while sessions.iter().any(|s| s.id == id) {
            suffix += 1;
            id = SessionId::new(format!("{}-{}", base, suffix));
        }

        tracing::debug!(session = %id, identity = %identity, %kind, writable, "registered store");
        sessions.push(Session {
            id: id.clone(),
            store,
            kind,
            writable,
        });
        id
    }

    /// Register a store using the kind and writability it reports.
    pub fn register_store(&self, store: Arc<dyn RecordStore>) -> SessionId {
        let (kind, writable) = (store.kind(), store.is_writable());
        self.register(store, kind, writable)
    }

    /// Find an open session.
    pub fn find(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().iter().find(|s| &s.id == id).cloned()
    }

    /// Close one session. Returns whether it was open.
    pub fn close(&self, id: &SessionId) -> bool {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|s| &s.id != id);
        before != sessions.len()
    }

    /// Close every session and return how many were open.
    ///
    /// Store handles are released once no resolution still holds a clone.
    pub fn close_all(&self) -> usize {
        let closed: Vec<Session> = std::mem::take(&mut *self.sessions.write());
        if !closed.is_empty() {
            tracing::debug!(count = closed.len(), "closed all stores");
        }
        closed.len()
    }

    /// Snapshot of all open sessions, in registration order.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions.read().clone()
    }

    /// First open session of the given kind.
    pub fn first_of_kind(&self, kind: StoreKind) -> Option<Session> {
        self.sessions.read().iter().find(|s| s.kind == kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

//! Background resolution.
//!
//! Store reads block, so a front end hands resolutions to a worker thread and
//! picks results up from a channel. Only the most recent submission counts;
//! results for older tickets arrive anyway and are meant to be dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::Result;
use crate::identifier::NavigationId;
use crate::resolver::{Resolution, Resolver};
use crate::selection::SelectionContext;

/// Submission order of a resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

struct Request {
    ticket: Ticket,
    target: NavigationId,
}

/// A finished resolution.
#[derive(Debug)]
pub struct ResolveEvent {
    pub ticket: Ticket,
    pub target: NavigationId,
    pub outcome: Result<Resolution>,
}

impl ResolveEvent {
    /// Apply the outcome to a selection context, as [`Resolver::resolve`] does.
    pub fn apply_to(self, context: &mut SelectionContext) -> Result<Resolution> {
        match self.outcome {
            Ok(resolution) => {
                context.apply(&resolution);
                Ok(resolution)
            }
            Err(e) => {
                context.fail(&self.target);
                Err(e)
            }
        }
    }
}

/// Runs resolutions on a dedicated thread.
///
/// Requests superseded before the thread reaches them are skipped. In-flight
/// store reads are never cancelled; their superseded results are filtered
/// by [`ResolveWorker::is_current`].
pub struct ResolveWorker {
    requests: Option<Sender<Request>>,
    events: Receiver<ResolveEvent>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ResolveWorker {
    /// Start the worker thread.
    pub fn spawn(resolver: Resolver) -> std::io::Result<Self> {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<Request>();
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let latest = Arc::new(AtomicU64::new(0));
        let worker_latest = Arc::clone(&latest);

        let handle = std::thread::Builder::new()
            .name("datlens-resolve".to_string())
            .spawn(move || {
                for request in request_rx.iter() {
                    if worker_latest.load(Ordering::Acquire) > request.ticket.0 {
                        tracing::trace!(ticket = request.ticket.0, target = %request.target, "skipped superseded request");
                        continue;
                    }
                    let outcome = resolver.resolve_target(&request.target);
                    let event = ResolveEvent {
                        ticket: request.ticket,
                        target: request.target,
                        outcome,
                    };
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self {
            requests: Some(request_tx),
            events: event_rx,
            latest,
            handle: Some(handle),
        })
    }

    /// Queue a resolution. The returned ticket becomes the current one.
    pub fn submit(&self, target: NavigationId) -> Ticket {
        let ticket = Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1);
        if let Some(requests) = &self.requests {
            if requests.send(Request { ticket, target }).is_err() {
                tracing::warn!(ticket = ticket.0, "resolve worker has stopped");
            }
        }
        ticket
    }

    /// Whether `ticket` is the most recent submission.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Next event for the current ticket, if one is ready. Stale events are
    /// discarded.
    pub fn try_next_current(&self) -> Option<ResolveEvent> {
        while let Ok(event) = self.events.try_recv() {
            if self.is_current(event.ticket) {
                return Some(event);
            }
            tracing::trace!(ticket = event.ticket.0, target = %event.target, "discarded stale resolution");
        }
        None
    }

    /// Wait up to `timeout` for the current ticket's event.
    pub fn recv_current(&self, timeout: Duration) -> Option<ResolveEvent> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(event) if self.is_current(event.ticket) => return Some(event),
                Ok(event) => {
                    tracing::trace!(ticket = event.ticket.0, target = %event.target, "discarded stale resolution");
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Stop accepting work and wait for the thread to exit.
    ///
    /// Queued requests are dropped unrun; a resolution already reading from
    /// its store is waited for.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.requests.take();
        self.latest.store(u64::MAX, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("resolve worker panicked");
            }
        }
    }
}

impl Drop for ResolveWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ResolveWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveWorker")
            .field("latest", &self.latest.load(Ordering::Relaxed))
            .field("running", &self.handle.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::family;
    use crate::registry::StoreRegistry;
    use std::sync::atomic::AtomicUsize;

    use datlens_common::FamilyId;
    use datlens_store::{MemoryStore, Record, RecordHeader, RecordStore, RecordType, StoreKind};

    /// Blocks the first range query until released.
    struct GateStore {
        inner: MemoryStore,
        entered: Sender<()>,
        release: Receiver<()>,
        queries: AtomicUsize,
    }

    impl RecordStore for GateStore {
        fn kind(&self) -> StoreKind {
            self.inner.kind()
        }

        fn identity(&self) -> &str {
            self.inner.identity()
        }

        fn read_record(&self, id: u32, expected: RecordType) -> datlens_store::Result<Option<Record>> {
            self.inner.read_record(id, expected)
        }

        fn query_range(&self, start: u32, end: u32) -> datlens_store::Result<Vec<RecordHeader>> {
            if self.queries.fetch_add(1, Ordering::SeqCst) == 0 {
                let _ = self.entered.send(());
                let _ = self.release.recv_timeout(Duration::from_secs(10));
            }
            self.inner.query_range(start, end)
        }

        fn record_count(&self) -> usize {
            self.inner.record_count()
        }
    }

    fn worker() -> (ResolveWorker, crate::identifier::SessionId) {
        let registry = Arc::new(StoreRegistry::new());
        let store = MemoryStore::new(StoreKind::Portal);
        store.insert_raw(0x0100_0001, 0x0100_0001u32.to_le_bytes().to_vec()).unwrap();
        let session = registry.register_store(Arc::new(store));
        (ResolveWorker::spawn(Resolver::new(registry)).unwrap(), session)
    }

    #[test]
    fn test_last_submission_wins() {
        let (worker, session) = worker();
        let first = worker.submit(NavigationId::family(family::SETUP, session.clone()));
        let second = worker.submit(NavigationId::family(family::GFX_OBJ, session));

        assert!(!worker.is_current(first));
        assert!(worker.is_current(second));

        let event = worker.recv_current(Duration::from_secs(10)).unwrap();
        assert_eq!(event.ticket, second);
        assert_eq!(event.outcome.unwrap().rows().len(), 1);
    }

    #[test]
    fn test_event_applies_to_context() {
        let (worker, session) = worker();
        let target = NavigationId::family(FamilyId::new(0x0700_0000), session);
        worker.submit(target.clone());

        let event = worker.recv_current(Duration::from_secs(10)).unwrap();
        let mut context = SelectionContext::new();
        assert!(event.apply_to(&mut context).is_err());
        assert_eq!(context.selection(), Some(&target));
        worker.shutdown();
    }

    #[test]
    fn test_superseded_requests_are_skipped() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        let store = Arc::new(GateStore {
            inner: MemoryStore::new(StoreKind::Portal),
            entered: entered_tx,
            release: release_rx,
            queries: AtomicUsize::new(0),
        });
        let registry = Arc::new(StoreRegistry::new());
        let session = registry.register_store(store.clone());
        let worker = ResolveWorker::spawn(Resolver::new(registry)).unwrap();

        worker.submit(NavigationId::family(family::GFX_OBJ, session.clone()));
        entered_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        worker.submit(NavigationId::family(family::SETUP, session.clone()));
        let current = worker.submit(NavigationId::family(family::PALETTE, session));
        release_tx.send(()).unwrap();

        let event = worker.recv_current(Duration::from_secs(10)).unwrap();
        assert_eq!(event.ticket, current);
        // The blocked first request and the current one; the middle one never ran.
        assert_eq!(store.queries.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_try_next_current_drains_stale_events() {
        let (worker, session) = worker();
        for _ in 0..3 {
            worker.submit(NavigationId::family(family::SETUP, session.clone()));
        }
        let current = worker.submit(NavigationId::family(family::GFX_OBJ, session));

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        let event = loop {
            if let Some(event) = worker.try_next_current() {
                break event;
            }
            assert!(std::time::Instant::now() < deadline, "no current event");
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(event.ticket, current);
        assert!(worker.try_next_current().is_none());
    }

    #[test]
    fn test_shutdown_with_queued_work_returns() {
        let (worker, session) = worker();
        for _ in 0..32 {
            worker.submit(NavigationId::family(family::GFX_OBJ, session.clone()));
        }
        worker.shutdown();
    }
}

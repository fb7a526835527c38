//! Lazy materialization of deferred entries.

use std::sync::Arc;

use datlens_store::Record;

use crate::error::{ResolveError, Result};
use crate::range::RangeEntry;
use crate::registry::Session;

/// Load the full record behind a placeholder entry.
///
/// The decoder is chosen from the origin the entry was listed under. The
/// first success is cached on the entry and later calls return it without
/// touching the store. On failure the entry is left as it was, so the call
/// can be retried.
pub fn materialize(session: &Session, entry: &mut RangeEntry) -> Result<Arc<Record>> {
    if let Some(record) = entry.materialized() {
        return Ok(record.clone());
    }

    let id = entry.id();
    let origin = entry.origin();
    let Some(record_type) = origin.decoder() else {
        tracing::error!(
            session = %session.id(),
            id = format_args!("{:#010x}", id),
            %origin,
            "classification gap: no decoder registered"
        );
        return Err(ResolveError::ClassificationGap { id, origin });
    };

    let detail = match session.store().read_record(id, record_type) {
        Ok(Some(record)) => {
            tracing::debug!(session = %session.id(), id = format_args!("{:#010x}", id), %record_type, "materialized");
            return Ok(entry.fill(Arc::new(record)));
        }
        Ok(None) => "record not present".to_string(),
        Err(e) => e.to_string(),
    };

    tracing::warn!(
        session = %session.id(),
        id = format_args!("{:#010x}", id),
        %record_type,
        error = %detail,
        "failed to materialize entry"
    );
    Err(ResolveError::DecodeFailed {
        id,
        record_type,
        detail,
    })
}

/// Outcome of materializing a batch of entries.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    /// Entries decoded by this call.
    pub loaded: usize,
    /// Entries that were already materialized.
    pub cached: usize,
    /// Entries that failed, with their errors. Siblings are unaffected.
    pub failures: Vec<(u32, ResolveError)>,
}

impl MaterializeReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Materialize every entry, containing failures per entry.
///
/// `on_entry` runs after each entry, successful or not.
pub fn materialize_all(
    session: &Session,
    entries: &mut [RangeEntry],
    mut on_entry: impl FnMut(&RangeEntry),
) -> MaterializeReport {
    let mut report = MaterializeReport::default();
    for entry in entries.iter_mut() {
        if !entry.is_placeholder() {
            report.cached += 1;
        } else {
            match materialize(session, entry) {
                Ok(_) => report.loaded += 1,
                Err(e) => report.failures.push((entry.id(), e)),
            }
        }
        on_entry(entry);
    }
    report
}

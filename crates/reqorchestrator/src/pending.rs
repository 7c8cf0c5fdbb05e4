//! The dense, index-addressed table of in-flight requests.
//!
//! Grounded in Design Note "Arena + indices for Pending": a
//! `Vec<Option<PendingRecord>>` with a free-list stands in for an
//! identity-keyed map, keeping cancellation/emission latches as plain
//! fields on each slot rather than scattered across a `HashMap`.

use reqcore::AbortedBy;
use tokio_util::sync::CancellationToken;

use crate::types::RequestId;

/// Per-in-flight bookkeeping: the internal abort controller and the
/// lifecycle latches that make `cancel` idempotent and `start`/`end`
/// emit-at-most-once.
pub(crate) struct PendingRecord {
    pub(crate) controller: CancellationToken,
    pub(crate) start_emitted: bool,
    pub(crate) canceled_emitted: bool,
    pub(crate) aborted_by: Option<AbortedBy>,
    /// Method/URL captured at `insert` time, so a `cancel`/timeout firing
    /// before the request has a `Request` in scope can still stamp a
    /// populated `RequestInfo` onto its event rather than an empty one.
    pub(crate) method: String,
    pub(crate) url: String,
}

impl PendingRecord {
    fn new(controller: CancellationToken, method: String, url: String) -> Self {
        Self {
            controller,
            start_emitted: false,
            canceled_emitted: false,
            aborted_by: None,
            method,
            url,
        }
    }
}

#[derive(Default)]
pub(crate) struct PendingTable {
    slots: Vec<Option<PendingRecord>>,
    free: Vec<usize>,
}

impl PendingTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a fresh record with its own internal controller and returns
    /// the id it was assigned.
    pub(crate) fn insert(
        &mut self,
        controller: CancellationToken,
        method: String,
        url: String,
    ) -> RequestId {
        let record = PendingRecord::new(controller, method, url);
        let index = if let Some(index) = self.free.pop() {
            self.slots[index] = Some(record);
            index
        } else {
            self.slots.push(Some(record));
            self.slots.len() - 1
        };
        RequestId(index as u64)
    }

    pub(crate) fn get(&self, id: RequestId) -> Option<&PendingRecord> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: RequestId) -> Option<&mut PendingRecord> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Removes and returns a record, freeing its slot for reuse.
    pub(crate) fn remove(&mut self, id: RequestId) -> Option<PendingRecord> {
        let index = id.0 as usize;
        let record = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        Some(record)
    }

    /// Every currently-live record's id and controller, for `cancel_all`.
    pub(crate) fn live_ids(&self) -> Vec<RequestId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| RequestId(i as u64)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_freed_slots() {
        let mut table = PendingTable::new();
        let a = table.insert(CancellationToken::new(), "GET".to_string(), "u".to_string());
        let b = table.insert(CancellationToken::new(), "GET".to_string(), "u".to_string());
        table.remove(a);
        let c = table.insert(CancellationToken::new(), "GET".to_string(), "u".to_string());
        assert_eq!(c, a);
        assert_ne!(b, c);
    }

    #[test]
    fn live_ids_excludes_removed() {
        let mut table = PendingTable::new();
        let a = table.insert(CancellationToken::new(), "GET".to_string(), "u".to_string());
        let b = table.insert(CancellationToken::new(), "GET".to_string(), "u".to_string());
        table.remove(a);
        assert_eq!(table.live_ids(), vec![b]);
    }
}

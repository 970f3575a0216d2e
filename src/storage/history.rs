use crate::model::position::PositionEstimate;
use parking_lot::RwLock;

/// Append-only trip history shared by all requests.
///
/// Every operation takes the lock once, so an append is never half-visible
/// and a completed `clear` can not be followed by the reappearance of an
/// entry appended before it.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: RwLock<Vec<PositionEstimate>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an estimate at the end of the log
    pub fn append(&self, estimate: PositionEstimate) {
        self.entries.write().push(estimate);
    }

    /// Snapshot of every entry in insertion order
    pub fn read_all(&self) -> Vec<PositionEstimate> {
        self.entries.read().clone()
    }

    /// Remove every entry, returning how many were dropped
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

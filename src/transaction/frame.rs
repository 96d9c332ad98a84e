use super::Change;

/// Index of a frame inside the [`FrameStack`](super::FrameStack) arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub(crate) usize);

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame_{}", self.0)
    }
}

/// One position in a frame's log
#[derive(Debug)]
pub(crate) enum LogEntry<K, V> {
    /// A change recorded directly at this level
    Change(Change<K, V>),

    /// A committed child frame whose whole log sits at this position
    Merged(FrameId),
}

/// Change log of a single transaction level
///
/// Entries are append-only and kept in the order the mutations happened.
/// A committed child is spliced in as a single [`LogEntry::Merged`] entry
/// instead of having its changes copied over.
#[derive(Debug)]
pub struct Frame<K, V> {
    entries: Vec<LogEntry<K, V>>,
    /// Changes reachable from this frame, merged children included
    change_count: usize,
}

impl<K, V> Frame<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            change_count: 0,
        }
    }

    /// Append a change recorded at this level
    pub fn record(&mut self, change: Change<K, V>) {
        self.entries.push(LogEntry::Change(change));
        self.change_count += 1;
    }

    /// Append a committed child frame holding `child_changes` changes
    pub(crate) fn merge(&mut self, child: FrameId, child_changes: usize) {
        self.entries.push(LogEntry::Merged(child));
        self.change_count += child_changes;
    }

    /// Number of changes a rollback of this frame would undo
    pub fn change_count(&self) -> usize {
        self.change_count
    }

    pub(crate) fn into_entries(self) -> Vec<LogEntry<K, V>> {
        self.entries
    }
}

impl<K, V> Default for Frame<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

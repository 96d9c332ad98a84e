// ============================================================================
// Frame Stack
// ============================================================================
//
// Open transactions form a stack; the frames themselves live in an arena and
// the stack only holds their indices. Committing a nested level pushes the
// child's index onto the parent's log, so a merge never moves change records.
// Arena slots are recycled once a frame is rolled back or finally discarded.
//
// ============================================================================

use super::frame::{Frame, FrameId, LogEntry};
use super::Change;
use std::collections::HashMap;
use std::hash::Hash;

/// Result of committing the innermost frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The frame was spliced into its parent, which can still undo it
    Merged { into: FrameId, changes: usize },

    /// The outermost frame was committed and its log dropped
    Discarded { changes: usize },
}

#[derive(Debug)]
pub struct FrameStack<K, V> {
    arena: Vec<Option<Frame<K, V>>>,
    free: Vec<usize>,
    /// Open frames, innermost last
    open: Vec<FrameId>,
}

impl<K, V> FrameStack<K, V> {
    pub fn new() -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Number of open transactions
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Innermost open frame
    pub fn top(&self) -> Option<FrameId> {
        self.open.last().copied()
    }

    /// Frames currently holding an arena slot, open or merged
    #[cfg(test)]
    pub fn allocated(&self) -> usize {
        self.arena.len() - self.free.len()
    }

    /// Changes the innermost frame would undo on rollback
    pub fn pending_changes(&self) -> usize {
        self.top()
            .and_then(|id| self.frame(id))
            .map_or(0, Frame::change_count)
    }

    /// Open a new innermost frame
    pub fn push(&mut self) -> FrameId {
        let id = match self.free.pop() {
            Some(slot) => {
                self.arena[slot] = Some(Frame::new());
                FrameId(slot)
            }
            None => {
                self.arena.push(Some(Frame::new()));
                FrameId(self.arena.len() - 1)
            }
        };
        self.open.push(id);
        id
    }

    /// Log `change` into the innermost frame
    ///
    /// Returns false, dropping the change, when no frame is open.
    pub fn record(&mut self, change: Change<K, V>) -> bool {
        let Some(id) = self.top() else {
            return false;
        };
        match self.frame_mut(id) {
            Some(frame) => {
                frame.record(change);
                true
            }
            None => false,
        }
    }

    /// Close the innermost frame, keeping its effects
    ///
    /// Returns None when no frame is open.
    pub fn commit(&mut self) -> Option<CommitOutcome> {
        let child = self.open.pop()?;
        let changes = self.frame(child).map_or(0, Frame::change_count);

        match self.top() {
            Some(parent) => {
                if let Some(frame) = self.frame_mut(parent) {
                    frame.merge(child, changes);
                }
                Some(CommitOutcome::Merged { into: parent, changes })
            }
            None => {
                self.drain(child, drop);
                Some(CommitOutcome::Discarded { changes })
            }
        }
    }
}

impl<K: Eq + Hash, V> FrameStack<K, V> {
    /// Close the innermost frame, undoing its changes against `map`
    ///
    /// Changes are undone newest first, descending into merged children in
    /// place. Returns the number of changes undone, or None when no frame is
    /// open.
    pub fn rollback(&mut self, map: &mut HashMap<K, V>) -> Option<usize> {
        let id = self.open.pop()?;
        Some(self.drain(id, |change| change.undo(map)))
    }
}

impl<K, V> FrameStack<K, V> {
    fn frame(&self, id: FrameId) -> Option<&Frame<K, V>> {
        self.arena.get(id.0).and_then(Option::as_ref)
    }

    fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame<K, V>> {
        self.arena.get_mut(id.0).and_then(Option::as_mut)
    }

    fn release(&mut self, id: FrameId) -> Vec<LogEntry<K, V>> {
        match self.arena.get_mut(id.0).and_then(Option::take) {
            Some(frame) => {
                self.free.push(id.0);
                frame.into_entries()
            }
            None => {
                debug_assert!(false, "{} released twice", id);
                Vec::new()
            }
        }
    }

    /// Free `id` and every frame merged into it, handing each change to
    /// `visit` in reverse chronological order
    fn drain(&mut self, id: FrameId, mut visit: impl FnMut(Change<K, V>)) -> usize {
        let mut visited = 0;
        let mut pending = vec![self.release(id).into_iter().rev()];

        while let Some(entries) = pending.last_mut() {
            match entries.next() {
                Some(LogEntry::Change(change)) => {
                    visit(change);
                    visited += 1;
                }
                Some(LogEntry::Merged(child)) => {
                    let child_entries = self.release(child);
                    pending.push(child_entries.into_iter().rev());
                }
                None => {
                    pending.pop();
                }
            }
        }

        visited
    }
}

impl<K, V> Default for FrameStack<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

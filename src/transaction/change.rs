// ============================================================================
// Transaction Change Tracking
// ============================================================================
//
// Each Change remembers the value a key held right before one mutation, so
// the mutation can be reversed on rollback. Changes are created when a write
// happens inside an open transaction and are never modified afterwards.
//
// ============================================================================

use std::collections::HashMap;
use std::hash::Hash;

/// A single reversible mutation of the backing map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<K, V> {
    /// `key` was assigned a new value; `prior` is what it held before
    Put { key: K, prior: Option<V> },

    /// `key` was removed; `prior` is what it held before (None if it was absent)
    Delete { key: K, prior: Option<V> },
}

impl<K: Eq + Hash, V> Change<K, V> {
    /// Reverse this change against `map`, consuming it
    ///
    /// - `Put` restores the prior value, or removes the key if there was none.
    /// - `Delete` restores the prior value if there was one; otherwise the
    ///   delete was a no-op and so is its reversal.
    pub fn undo(self, map: &mut HashMap<K, V>) {
        match self {
            Change::Put { key, prior: Some(value) } => {
                map.insert(key, value);
            }
            Change::Put { key, prior: None } => {
                map.remove(&key);
            }
            Change::Delete { key, prior: Some(value) } => {
                map.insert(key, value);
            }
            Change::Delete { prior: None, .. } => {}
        }
    }
}

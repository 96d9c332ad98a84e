// ============================================================================
// Transaction Log Module
// ============================================================================
//
// Undo log for nested transactions:
// - Change: a reversible record of one put/delete
// - Frame: the ordered changes of one nesting level
// - FrameStack: the open levels, with frames held in an index arena
//
// ============================================================================

mod change;
mod frame;
mod stack;

pub(crate) use change::Change;
pub(crate) use stack::{CommitOutcome, FrameStack};

/// Snapshot of the innermost open transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionInfo {
    /// Nesting depth, 1 for the outermost transaction
    pub depth: usize,

    /// Changes a rollback would undo, including merged children
    pub pending_changes: usize,
}

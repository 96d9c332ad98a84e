// ============================================================================
// txcache Library
// ============================================================================

//! In-memory key-value cache with nested, undoable transactions.
//!
//! Writes go straight to the backing map; while a transaction is open each
//! write also logs the value it replaced. Committing a nested transaction
//! hands its log to the enclosing one, and rolling back replays the log
//! newest-first to restore the state from before `begin_transaction`.
//!
//! ```
//! use txcache::TransactionalCache;
//!
//! # fn main() -> txcache::Result<()> {
//! let cache = TransactionalCache::new();
//! cache.put("balance", 100);
//!
//! cache.begin_transaction()?;
//! cache.put("balance", 150);
//!
//! cache.begin_transaction()?;
//! cache.put("balance", 175);
//! cache.commit_transaction()?; // merged into the outer transaction
//!
//! cache.rollback_transaction()?; // undoes both writes
//! assert_eq!(cache.get(&"balance"), Some(100));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod facade;
pub mod interface;
mod transaction;

// Re-export main types for convenience
pub use config::{CacheConfig, NestingPolicy};
pub use crate::core::{CacheError, Result};
pub use facade::TransactionalCache;
pub use interface::Cache;
pub use transaction::TransactionInfo;

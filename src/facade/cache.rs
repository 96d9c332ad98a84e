use crate::config::CacheConfig;
use crate::core::{CacheError, Result};
use crate::interface::Cache;
use crate::transaction::{Change, CommitOutcome, FrameStack, TransactionInfo};
use log::{debug, trace, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;

/// Backing map and open transactions, guarded together
struct CacheState<K, V> {
    map: HashMap<K, V>,
    frames: FrameStack<K, V>,
}

/// In-memory key-value cache with nested, undoable transactions
///
/// Writes are applied to the map immediately, so `get` always sees the
/// latest value. While a transaction is open, every write also logs the
/// value it replaced, which is what rollback restores.
///
/// All callers share a single stack of open transactions. A write made by
/// one thread while another thread's transaction is open becomes part of
/// that transaction.
///
/// # Examples
///
/// ```
/// use txcache::TransactionalCache;
///
/// # fn main() -> txcache::Result<()> {
/// let cache = TransactionalCache::new();
/// cache.put("key1", "value1");
///
/// cache.begin_transaction()?;
/// cache.put("key1", "changed");
/// cache.rollback_transaction()?;
///
/// assert_eq!(cache.get(&"key1"), Some("value1"));
/// # Ok(())
/// # }
/// ```
pub struct TransactionalCache<K, V> {
    state: RwLock<CacheState<K, V>>,
    config: CacheConfig,
}

impl<K, V> TransactionalCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache with the default configuration
    pub fn new() -> Self {
        Self::build(HashMap::new(), CacheConfig::default())
    }

    /// Create an empty cache with the given configuration
    ///
    /// # Errors
    /// Returns `InvalidConfig` if space for `initial_capacity` entries
    /// cannot be reserved
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let mut map = HashMap::new();
        map.try_reserve(config.initial_capacity).map_err(|err| {
            CacheError::InvalidConfig(format!(
                "cannot reserve initial_capacity {}: {}",
                config.initial_capacity, err
            ))
        })?;
        Ok(Self::build(map, config))
    }

    fn build(map: HashMap<K, V>, config: CacheConfig) -> Self {
        Self {
            state: RwLock::new(CacheState {
                map,
                frames: FrameStack::new(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current value for `key`
    pub fn get(&self, key: &K) -> Option<V> {
        self.state.read().map.get(key).cloned()
    }

    /// Associate `value` with `key`
    pub fn put(&self, key: K, value: V) {
        let mut guard = self.state.write();
        let CacheState { map, frames } = &mut *guard;

        if !frames.is_empty() {
            let prior = map.get(&key).cloned();
            frames.record(Change::Put {
                key: key.clone(),
                prior,
            });
            trace!("Logged put at depth {}", frames.depth());
        }
        map.insert(key, value);
    }

    /// Remove `key`; a no-op if it is absent
    pub fn delete(&self, key: &K) {
        let mut guard = self.state.write();
        let CacheState { map, frames } = &mut *guard;

        if !frames.is_empty() {
            let prior = map.get(key).cloned();
            frames.record(Change::Delete {
                key: key.clone(),
                prior,
            });
            trace!("Logged delete at depth {}", frames.depth());
        }
        map.remove(key);
    }

    /// Open a new transaction level
    ///
    /// # Errors
    /// Under [`NestingPolicy::SingleLevel`](crate::NestingPolicy::SingleLevel),
    /// returns `InvalidState` if a transaction is already open.
    pub fn begin_transaction(&self) -> Result<()> {
        let mut state = self.state.write();

        if let Some(max_depth) = self.config.nesting.max_depth() {
            if state.frames.depth() >= max_depth {
                warn!(
                    "Begin rejected: depth {} reached under {} policy",
                    state.frames.depth(),
                    self.config.nesting
                );
                return Err(CacheError::InvalidState(
                    "A transaction is already in progress".into(),
                ));
            }
        }

        let id = state.frames.push();
        debug!("Began transaction {} at depth {}", id, state.frames.depth());
        Ok(())
    }

    /// Close the innermost transaction, keeping its changes
    ///
    /// If an enclosing transaction is open, the committed changes become
    /// part of it and are undone if it rolls back.
    ///
    /// # Errors
    /// Returns `InvalidState` if no transaction is open
    pub fn commit_transaction(&self) -> Result<()> {
        let mut state = self.state.write();

        match state.frames.commit() {
            Some(CommitOutcome::Merged { into, changes }) => {
                debug!("Committed {} change(s) into parent {}", changes, into);
            }
            Some(CommitOutcome::Discarded { changes }) => {
                debug!("Committed outermost transaction with {} change(s)", changes);
            }
            None => {
                warn!("Commit requested with no active transaction");
                return Err(CacheError::InvalidState(
                    "No active transaction to commit".into(),
                ));
            }
        }
        Ok(())
    }

    /// Close the innermost transaction, undoing its changes
    ///
    /// Enclosing transactions stay open and untouched.
    ///
    /// # Errors
    /// Returns `InvalidState` if no transaction is open
    pub fn rollback_transaction(&self) -> Result<()> {
        let mut guard = self.state.write();
        let CacheState { map, frames } = &mut *guard;

        match frames.rollback(map) {
            Some(undone) => {
                debug!(
                    "Rolled back {} change(s), depth now {}",
                    undone,
                    frames.depth()
                );
                Ok(())
            }
            None => {
                warn!("Rollback requested with no active transaction");
                Err(CacheError::InvalidState(
                    "No active transaction to rollback".into(),
                ))
            }
        }
    }

    /// Roll back every open transaction, innermost first
    ///
    /// # Errors
    /// Returns `InvalidState` if no transaction is open
    pub fn rollback_all(&self) -> Result<()> {
        let mut guard = self.state.write();
        let CacheState { map, frames } = &mut *guard;

        let mut levels = 0;
        let mut undone = 0;
        while let Some(count) = frames.rollback(map) {
            levels += 1;
            undone += count;
        }

        if levels == 0 {
            warn!("Rollback requested with no active transaction");
            return Err(CacheError::InvalidState(
                "No active transaction to rollback".into(),
            ));
        }

        debug!("Rolled back {} level(s), {} change(s)", levels, undone);
        Ok(())
    }

    /// Number of open transactions
    pub fn depth(&self) -> usize {
        self.state.read().frames.depth()
    }

    pub fn in_transaction(&self) -> bool {
        self.depth() > 0
    }

    /// Innermost open transaction, if any
    pub fn transaction_info(&self) -> Option<TransactionInfo> {
        let state = self.state.read();
        if state.frames.is_empty() {
            return None;
        }
        Some(TransactionInfo {
            depth: state.frames.depth(),
            pending_changes: state.frames.pending_changes(),
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.state.read().map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().map.is_empty()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.state.read().map.clone()
    }
}

impl<K, V> Default for TransactionalCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache<K, V> for TransactionalCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Option<V> {
        TransactionalCache::get(self, key)
    }

    fn put(&self, key: K, value: V) {
        TransactionalCache::put(self, key, value)
    }

    fn delete(&self, key: &K) {
        TransactionalCache::delete(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NestingPolicy;

    #[test]
    fn test_writes_outside_transaction_are_not_logged() {
        let cache = TransactionalCache::new();
        cache.put("a", 1);
        cache.delete(&"a");
        cache.put("b", 2);

        assert_eq!(cache.depth(), 0);
        assert_eq!(cache.transaction_info(), None);
        assert_eq!(cache.state.read().frames.allocated(), 0);
    }

    #[test]
    fn test_transaction_info_counts_merged_changes() {
        let cache = TransactionalCache::new();
        cache.begin_transaction().unwrap();
        cache.put("a", 1);
        cache.begin_transaction().unwrap();
        cache.put("b", 2);
        cache.delete(&"missing");

        assert_eq!(
            cache.transaction_info(),
            Some(TransactionInfo { depth: 2, pending_changes: 2 })
        );

        cache.commit_transaction().unwrap();
        assert_eq!(
            cache.transaction_info(),
            Some(TransactionInfo { depth: 1, pending_changes: 3 })
        );
    }

    #[test]
    fn test_single_level_policy_rejects_nested_begin() {
        let config = CacheConfig::new().nesting(NestingPolicy::SingleLevel);
        let cache: TransactionalCache<&str, i32> = TransactionalCache::with_config(config).unwrap();

        cache.begin_transaction().unwrap();
        let err = cache.begin_transaction().unwrap_err();
        assert_eq!(
            err,
            CacheError::InvalidState("A transaction is already in progress".into())
        );
        assert_eq!(cache.depth(), 1);

        cache.commit_transaction().unwrap();
        assert!(cache.begin_transaction().is_ok());
    }

    #[test]
    fn test_with_config_rejects_unreservable_capacity() {
        let config = CacheConfig::new().initial_capacity(usize::MAX);
        let result: Result<TransactionalCache<u8, u8>> = TransactionalCache::with_config(config);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_config_capacity_overflow_for_large_values() {
        let config = CacheConfig::new().initial_capacity(isize::MAX as usize / 64);
        let result: Result<TransactionalCache<u64, [u8; 256]>> =
            TransactionalCache::with_config(config);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_with_config_reserves_capacity() {
        let config = CacheConfig::new().initial_capacity(128);
        let cache: TransactionalCache<u64, u64> = TransactionalCache::with_config(config).unwrap();
        assert!(cache.state.read().map.capacity() >= 128);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rollback_all_unwinds_every_level() {
        let cache = TransactionalCache::new();
        cache.put("k", "original");

        cache.begin_transaction().unwrap();
        cache.put("k", "one");
        cache.begin_transaction().unwrap();
        cache.put("k", "two");
        cache.begin_transaction().unwrap();
        cache.delete(&"k");

        cache.rollback_all().unwrap();
        assert_eq!(cache.get(&"k"), Some("original"));
        assert_eq!(cache.depth(), 0);
        assert!(cache.rollback_all().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_map_inspection() {
        let cache = TransactionalCache::new();
        assert!(cache.is_empty());
        cache.put(1u32, "one");
        cache.put(2u32, "two");

        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key(&1));
        assert!(!cache.contains_key(&3));
        assert_eq!(cache.snapshot(), HashMap::from([(1, "one"), (2, "two")]));
    }

    #[test]
    fn test_usable_through_cache_trait() {
        fn exercise(cache: &dyn Cache<String, u64>) {
            cache.put("a".to_string(), 1);
            cache.delete(&"b".to_string());
        }

        let cache: TransactionalCache<String, u64> = TransactionalCache::new();
        exercise(&cache);
        assert_eq!(cache.get(&"a".to_string()), Some(1));
    }
}

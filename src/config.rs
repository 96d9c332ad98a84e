/// How `begin_transaction` behaves when a transaction is already open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NestingPolicy {
    /// Every `begin` opens a new level. Committing a level merges its
    /// changes into the enclosing one.
    #[default]
    Nested,

    /// At most one transaction may be open. A second `begin` fails with
    /// `InvalidState`.
    SingleLevel,
}

impl NestingPolicy {
    /// Maximum number of simultaneously open transactions, if bounded
    pub fn max_depth(&self) -> Option<usize> {
        match self {
            NestingPolicy::Nested => None,
            NestingPolicy::SingleLevel => Some(1),
        }
    }
}

impl std::fmt::Display for NestingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NestingPolicy::Nested => write!(f, "NESTED"),
            NestingPolicy::SingleLevel => write!(f, "SINGLE_LEVEL"),
        }
    }
}

/// Cache configuration
///
/// Built with the usual chained setters:
///
/// ```
/// use txcache::{CacheConfig, NestingPolicy};
///
/// let config = CacheConfig::new()
///     .nesting(NestingPolicy::SingleLevel)
///     .initial_capacity(1024);
/// assert_eq!(config.nesting.max_depth(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Begin-transaction policy
    pub nesting: NestingPolicy,

    /// Number of entries the backing map is pre-sized for
    pub initial_capacity: usize,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self {
            nesting: NestingPolicy::Nested,
            initial_capacity: 0,
        }
    }

    /// Set the begin-transaction policy
    pub fn nesting(mut self, policy: NestingPolicy) -> Self {
        self.nesting = policy;
        self
    }

    /// Set the initial capacity of the backing map
    ///
    /// The space is reserved by `TransactionalCache::with_config`, which
    /// fails with `InvalidConfig` if it cannot be allocated.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

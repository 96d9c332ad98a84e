/// A generic key-value cache.
///
/// Lets callers be written against the plain get/put/delete surface without
/// caring whether the implementation tracks transactions.
pub trait Cache<K, V>: Send + Sync {
    /// Current value for `key`, if any
    fn get(&self, key: &K) -> Option<V>;

    /// Associate `value` with `key`, replacing any previous value
    fn put(&self, key: K, value: V);

    /// Remove `key`; removing an absent key does nothing
    fn delete(&self, key: &K);
}

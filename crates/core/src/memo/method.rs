use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::function::{CacheStats, Memo};

/// Per-instance cache for method results.
///
/// Embed one as a field of the owning struct and route memoized methods through
/// [`MethodMemo::call`]. Entries are keyed by `(method name, arguments)`, so
/// several methods with the same argument type can share one table, and every
/// instance owns its own entries. Calling the uncached implementation directly
/// bypasses the table.
pub struct MethodMemo<K, V> {
    inner: Memo<(&'static str, K), V>,
}

impl<K, V> MethodMemo<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            inner: Memo::new("method"),
        }
    }

    /// Return the cached result of `method(args)`, running `compute` on a miss.
    pub fn call<F>(&self, method: &'static str, args: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        self.inner.get_or_compute((method, args), compute)
    }

    /// Fallible form of [`MethodMemo::call`]; errors are not cached.
    pub fn try_call<F, E>(&self, method: &'static str, args: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.inner.get_or_try_compute((method, args), compute)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.stats()
    }

    pub fn clear(&self) {
        self.inner.clear()
    }
}

impl<K, V> Default for MethodMemo<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for MethodMemo<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodMemo").field("inner", &self.inner).finish()
    }
}

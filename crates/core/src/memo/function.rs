use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// Hit/miss counters for a cache table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

struct Table<K, V> {
    entries: HashMap<K, Arc<V>>,
    stats: CacheStats,
}

/// Function-level result cache keyed by the call's arguments.
///
/// The first call for a key runs the computation and stores the result; later
/// calls return the stored `Arc` without recomputing. Only meaningful for
/// computations that are deterministic in their key.
pub struct Memo<K, V> {
    name: &'static str,
    table: Mutex<Table<K, V>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Create an empty cache. `name` only appears in log messages.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            table: Mutex::new(Table {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Table<K, V>> {
        // A panic inside a computation never happens under the lock, so the
        // table is consistent even if poisoned.
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look up a cached value without computing it. Does not touch the counters.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().entries.get(key).cloned()
    }

    /// Return the cached value for `key`, computing it with `compute` on a miss.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        match self.get_or_try_compute(key, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`Memo::get_or_compute`]. Errors are returned to the
    /// caller and nothing is stored, so a later call retries the computation.
    pub fn get_or_try_compute<F, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        {
            let mut table = self.lock();
            if let Some(value) = table.entries.get(&key).cloned() {
                table.stats.hits += 1;
                log::trace!("{}: cache hit for {:?}", self.name, key);
                return Ok(value);
            }
            table.stats.misses += 1;
        }

        log::debug!("{}: computing entry for {:?}", self.name, key);
        let value = Arc::new(compute()?);

        // Another thread may have filled the slot meanwhile; keep the first value.
        let mut table = self.lock();
        Ok(table.entries.entry(key).or_insert(value).clone())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a value is cached for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut table = self.lock();
        table.entries.clear();
        table.stats = CacheStats::default();
    }
}

impl<K, V> fmt::Debug for Memo<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.lock();
        f.debug_struct("Memo")
            .field("name", &self.name)
            .field("entries", &table.entries.len())
            .field("stats", &table.stats)
            .finish()
    }
}

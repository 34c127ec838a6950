//! Single-entry memoization for derived views.

use std::sync::Arc;

/// Compares shared collections by allocation rather than contents, so a
/// key check stays O(1) however large the collection is.
#[derive(Debug)]
pub struct ByIdentity<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> Clone for ByIdentity<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ByIdentity<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for ByIdentity<T> {}

/// Cache holding the last `(key, value)` pair.
#[derive(Debug, Clone)]
pub struct Memo<K, V> {
    entry: Option<(K, V)>,
    misses: u64,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            misses: 0,
        }
    }
}

impl<K: PartialEq, V: Clone> Memo<K, V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value when `key` equals the stored key, otherwise
    /// computes, stores, and returns a fresh one.
    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Some((cached, value)) = &self.entry
            && *cached == key
        {
            return value.clone();
        }

        self.misses += 1;
        let value = compute(&key);
        self.entry = Some((key, value.clone()));
        value
    }

    /// Number of times a value had to be computed.
    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }
}

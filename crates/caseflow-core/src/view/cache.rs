// Bounded per-session response cache.
//
// One cache serves every registry in a session, so entries are
// type-erased behind `Any` and recovered by downcast. Fingerprints embed
// the resource path, so two entity types can never share a key.

use std::any::Any;
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use tracing::trace;

use super::request::ListPage;

/// Fingerprint-keyed store of list pages with explicit lifecycle: created
/// with the session, consulted before each fetch, cleared on close.
///
/// Bounded; when full, the oldest-inserted entry is evicted. Overwriting
/// a key counts as a fresh insertion, so a `refresh()` repopulation moves
/// that entry to the young end.
pub struct ResponseCache {
    entries: Mutex<IndexMap<String, Box<dyn Any + Send + Sync>>>,
    capacity: usize,
}

impl ResponseCache {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Cached page for this fingerprint, if present and of the expected
    /// row type.
    pub fn get<T: Send + Sync + 'static>(&self, fingerprint: &str) -> Option<ListPage<T>> {
        let entries = self.lock();
        let page = entries
            .get(fingerprint)?
            .downcast_ref::<ListPage<T>>()?
            .clone();
        trace!(fingerprint, "response cache hit");
        Some(page)
    }

    /// Insert or refresh an entry, evicting the oldest when over
    /// capacity.
    pub fn put<T: Send + Sync + 'static>(&self, fingerprint: String, page: ListPage<T>) {
        let mut entries = self.lock();
        // Re-insert so an overwrite ages like a new entry.
        entries.shift_remove(&fingerprint);
        entries.insert(fingerprint, Box::new(page));
        while entries.len() > self.capacity {
            entries.shift_remove_index(0);
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IndexMap<String, Box<dyn Any + Send + Sync>>> {
        // A poisoned cache only means a panicking reader; the map itself
        // is still coherent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::sync::Arc;

    fn page(tag: &str) -> ListPage<String> {
        ListPage {
            rows: vec![Arc::new(tag.to_owned())],
            total: 1,
        }
    }

    #[test]
    fn round_trips_by_fingerprint() {
        let cache = ResponseCache::new(4);
        cache.put("a".into(), page("alpha"));

        let hit = cache.get::<String>("a").unwrap();
        assert_eq!(*hit.rows[0], "alpha");
        assert!(cache.get::<String>("b").is_none());
    }

    #[test]
    fn wrong_type_is_a_miss_not_a_panic() {
        let cache = ResponseCache::new(4);
        cache.put("a".into(), page("alpha"));
        assert!(cache.get::<u64>("a").is_none());
    }

    #[test]
    fn evicts_oldest_inserted() {
        let cache = ResponseCache::new(2);
        cache.put("a".into(), page("1"));
        cache.put("b".into(), page("2"));
        cache.put("c".into(), page("3"));

        assert!(cache.get::<String>("a").is_none());
        assert!(cache.get::<String>("b").is_some());
        assert!(cache.get::<String>("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwrite_refreshes_age() {
        let cache = ResponseCache::new(2);
        cache.put("a".into(), page("1"));
        cache.put("b".into(), page("2"));
        cache.put("a".into(), page("1-again"));
        cache.put("c".into(), page("3"));

        // "b" is now the oldest and gets evicted.
        assert!(cache.get::<String>("b").is_none());
        assert_eq!(*cache.get::<String>("a").unwrap().rows[0], "1-again");
    }

    #[test]
    fn clear_empties() {
        let cache = ResponseCache::default();
        cache.put("a".into(), page("1"));
        cache.clear();
        assert!(cache.is_empty());
    }
}

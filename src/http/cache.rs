//! LRU Thumbnail Cache
//!
//! Keeps encoded thumbnails in memory with an entry limit. Nothing is
//! persisted; a restart starts cold.

use bytes::Bytes;
use dashmap::DashMap;
use std::time::SystemTime;

/// Cache entry with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Bytes,
    pub last_accessed: SystemTime,
    pub hits: usize,
}

impl CacheEntry {
    fn new(data: Bytes) -> Self {
        Self {
            data,
            last_accessed: SystemTime::now(),
            hits: 0,
        }
    }

    fn touch(&mut self) {
        self.last_accessed = SystemTime::now();
        self.hits += 1;
    }
}

/// Encoded thumbnails keyed by folder and title
pub struct ThumbnailCache {
    entries: DashMap<String, CacheEntry>,
    max_entries: usize,
}

impl ThumbnailCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    pub fn make_key(folder: &str, title: &str) -> String {
        format!("{}/{}", folder, title)
    }

    pub fn get(&self, folder: &str, title: &str) -> Option<Bytes> {
        let key = Self::make_key(folder, title);
        self.entries.get_mut(&key).map(|mut entry| {
            entry.touch();
            entry.data.clone()
        })
    }

    pub fn contains(&self, folder: &str, title: &str) -> bool {
        self.entries.contains_key(&Self::make_key(folder, title))
    }

    pub fn insert(&self, folder: &str, title: &str, data: Bytes) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::make_key(folder, title);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        self.entries.insert(key, CacheEntry::new(data));
    }

    /// Drop the least recently used quarter of the cache (at least one entry).
    fn evict_lru(&self) {
        let mut by_age: Vec<(String, SystemTime)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().last_accessed))
            .collect();
        by_age.sort_by_key(|(_, accessed)| *accessed);

        let count = (self.max_entries / 4).max(1);
        for (key, _) in by_age.into_iter().take(count) {
            self.entries.remove(&key);
        }
        tracing::debug!("Evicted {} thumbnails, {} remain", count, self.entries.len());
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            entry_count: 0,
            total_size_bytes: 0,
            max_entries: self.max_entries,
        };
        for entry in self.entries.iter() {
            stats.entry_count += 1;
            stats.total_size_bytes += entry.value().data.len();
        }
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache statistics
#[derive(Debug, serde::Serialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub total_size_bytes: usize,
    pub max_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cache_insert_get() {
        let cache = ThumbnailCache::new(10);
        cache.insert("Album", "a.jpg", Bytes::from("jpeg"));

        assert!(cache.contains("Album", "a.jpg"));
        assert_eq!(cache.get("Album", "a.jpg"), Some(Bytes::from("jpeg")));
        assert_eq!(cache.get("Album", "b.jpg"), None);
        assert_eq!(cache.get("Other", "a.jpg"), None);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let cache = ThumbnailCache::new(3);
        cache.insert("f", "a", Bytes::from("a"));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("f", "b", Bytes::from("b"));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("f", "c", Bytes::from("c"));
        std::thread::sleep(Duration::from_millis(5));
        // Refresh "a" so "b" becomes the oldest.
        cache.get("f", "a");

        cache.insert("f", "d", Bytes::from("d"));
        assert_eq!(cache.len(), 3);
        assert!(!cache.contains("f", "b"));
        assert!(cache.contains("f", "a"));
        assert!(cache.contains("f", "d"));
    }

    #[test]
    fn test_cache_replace_does_not_evict() {
        let cache = ThumbnailCache::new(2);
        cache.insert("f", "a", Bytes::from("1"));
        cache.insert("f", "b", Bytes::from("2"));
        cache.insert("f", "a", Bytes::from("3"));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("f", "a"), Some(Bytes::from("3")));
    }

    #[test]
    fn test_cache_disabled() {
        let cache = ThumbnailCache::new(0);
        cache.insert("f", "a", Bytes::from("1"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_stats() {
        let cache = ThumbnailCache::new(4);
        cache.insert("f", "a", Bytes::from("1234"));
        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.total_size_bytes, 4);
        assert_eq!(stats.max_entries, 4);
    }
}

//! Icon cache storage.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::cached_image::CachedImage;

/// Key/value storage for decoded icons.
///
/// Implementations serialize their own mutations; callers share one
/// instance across threads without extra locking. At most one entry per
/// key, last write wins. Eviction is up to the implementation.
pub trait ImageCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedImage>;

    fn set(&self, key: &str, image: CachedImage);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process icon cache.
///
/// With a bound, storing a new key into a full cache drops an arbitrary
/// existing entry.
#[derive(Debug, Default)]
pub struct MemoryImageCache {
    entries: RwLock<HashMap<String, CachedImage>>,
    max_entries: usize,
}

impl MemoryImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_entries == 0` means unbounded.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl ImageCache for MemoryImageCache {
    fn get(&self, key: &str) -> Option<CachedImage> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, image: CachedImage) {
        let mut entries = self.entries.write();

        if self.max_entries > 0
            && entries.len() >= self.max_entries
            && !entries.contains_key(key)
        {
            let victim = entries.keys().next().cloned();
            if let Some(victim) = victim {
                entries.remove(&victim);
                tracing::debug!("Icon cache full, evicted {}", victim);
            }
        }

        entries.insert(key.to_string(), image);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn image(size: u32) -> CachedImage {
        CachedImage::new(DynamicImage::new_rgba8(size, size))
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let cache = MemoryImageCache::new();
        assert!(cache.get("01d").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let cache = MemoryImageCache::new();
        let icon = image(1);
        cache.set("01d", icon.clone());

        let hit = cache.get("01d").unwrap();
        assert!(hit.ptr_eq(&icon));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MemoryImageCache::new();
        let first = image(1);
        let second = image(2);
        cache.set("01d", first.clone());
        cache.set("01d", second.clone());

        let hit = cache.get("01d").unwrap();
        assert!(hit.ptr_eq(&second));
        assert!(!hit.ptr_eq(&first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_distinct_keys_are_all_kept() {
        let cache = MemoryImageCache::new();
        let threads = 8;
        let per_thread = 50;

        std::thread::scope(|s| {
            for t in 0..threads {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..per_thread {
                        cache.set(&format!("{t}-{i}"), image(1));
                    }
                });
            }
        });

        assert_eq!(cache.len(), threads * per_thread);
        for t in 0..threads {
            for i in 0..per_thread {
                assert!(cache.get(&format!("{t}-{i}")).is_some());
            }
        }
    }

    #[test]
    fn test_concurrent_same_key_keeps_one_of_the_writes() {
        let cache = MemoryImageCache::new();
        let candidates: Vec<CachedImage> = (1..=4).map(image).collect();

        std::thread::scope(|s| {
            for candidate in &candidates {
                let cache = &cache;
                s.spawn(move || cache.set("01d", candidate.clone()));
            }
        });

        let hit = cache.get("01d").unwrap();
        assert!(candidates.iter().any(|c| c.ptr_eq(&hit)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_bounded_cache_evicts_on_new_key() {
        let cache = MemoryImageCache::with_max_entries(2);
        cache.set("01d", image(1));
        cache.set("02d", image(1));
        cache.set("03d", image(1));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("03d").is_some());
    }

    #[test]
    fn test_bounded_cache_overwrite_does_not_evict() {
        let cache = MemoryImageCache::with_max_entries(2);
        cache.set("01d", image(1));
        cache.set("02d", image(1));
        cache.set("02d", image(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("01d").is_some());
        assert_eq!(cache.get("02d").unwrap().width(), 2);
    }
}

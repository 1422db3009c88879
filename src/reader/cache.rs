use std::num::NonZeroUsize;
use std::path::PathBuf;

use lru::LruCache;

use super::SeekOrigin;

/// Number of decoded chunks kept per session
pub const CACHE_CAPACITY: usize = 8;

/// Cache key: one fully-specified chunk request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub path: PathBuf,
    pub offset: i64,
    pub origin: SeekOrigin,
    pub len: Option<u64>,
}

/// Bounded memoization of decoded chunk reads, least-recently-used eviction.
pub struct ReadCache {
    entries: LruCache<ChunkKey, String>,
}

impl ReadCache {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap();
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, key: &ChunkKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: ChunkKey, text: String) {
        self.entries.put(key, text);
    }

    /// Drop every entry; called when the session switches files
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReadCache {
    fn default() -> Self {
        Self::new()
    }
}

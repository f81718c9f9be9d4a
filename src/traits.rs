use std::sync::Arc;

use crate::error::CacheResult;
use crate::item::CacheItem;

/// A key/value cache whose items carry tags, so that every item with a given
/// tag can be invalidated in one call.
///
/// Methods take `&self`; implementations that hold mutable state guard it
/// internally so one instance can be shared behind an `Arc`.
pub trait TagAwareCache: Send + Sync {
    /// Fetches an item. A missing key yields a miss, not an error.
    fn get_item(&self, key: &str) -> CacheResult<CacheItem>;

    /// Fetches several items, in the order of `keys`.
    fn get_items(&self, keys: &[String]) -> CacheResult<Vec<CacheItem>>;

    /// Returns true if a live item exists for `key`.
    fn has_item(&self, key: &str) -> CacheResult<bool>;

    fn delete_item(&self, key: &str) -> CacheResult<bool>;

    fn delete_items(&self, keys: &[String]) -> CacheResult<bool>;

    /// Invalidates every item carrying any of `tags`.
    fn invalidate_tags(&self, tags: &[String]) -> CacheResult<bool>;

    /// Removes every item.
    fn clear(&self) -> CacheResult<bool>;

    /// Stores an item immediately.
    fn save(&self, item: CacheItem) -> CacheResult<bool>;

    /// Buffers an item until [`TagAwareCache::commit`] is called.
    fn save_deferred(&self, item: CacheItem) -> CacheResult<bool>;

    /// Writes out every buffered item.
    fn commit(&self) -> CacheResult<bool>;
}

impl<C: TagAwareCache + ?Sized> TagAwareCache for Arc<C> {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        (**self).get_item(key)
    }

    fn get_items(&self, keys: &[String]) -> CacheResult<Vec<CacheItem>> {
        (**self).get_items(keys)
    }

    fn has_item(&self, key: &str) -> CacheResult<bool> {
        (**self).has_item(key)
    }

    fn delete_item(&self, key: &str) -> CacheResult<bool> {
        (**self).delete_item(key)
    }

    fn delete_items(&self, keys: &[String]) -> CacheResult<bool> {
        (**self).delete_items(keys)
    }

    fn invalidate_tags(&self, tags: &[String]) -> CacheResult<bool> {
        (**self).invalidate_tags(tags)
    }

    fn clear(&self) -> CacheResult<bool> {
        (**self).clear()
    }

    fn save(&self, item: CacheItem) -> CacheResult<bool> {
        (**self).save(item)
    }

    fn save_deferred(&self, item: CacheItem) -> CacheResult<bool> {
        (**self).save_deferred(item)
    }

    fn commit(&self) -> CacheResult<bool> {
        (**self).commit()
    }
}

use std::collections::BTreeSet;

use parking_lot::Mutex;
use transactional_tag_cache::{CacheError, CacheItem, CacheResult, TagAwareCache};

/// A call received by the recording cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetItem(String),
    GetItems(Vec<String>),
    HasItem(String),
    DeleteItem(String),
    DeleteItems(Vec<String>),
    InvalidateTags(Vec<String>),
    Clear,
    Save(String),
    SaveDeferred(String),
    Commit,
}

/// Fake underlying cache that records every call it receives
#[derive(Debug, Default)]
pub struct RecordingCache {
    calls: Mutex<Vec<Call>>,
    fail_invalidation: bool,
}

#[allow(dead_code)]
impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose tag invalidation always fails
    pub fn failing_invalidation() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_invalidation: true,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Every `invalidate_tags` call, each as a set
    pub fn invalidations(&self) -> Vec<BTreeSet<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::InvalidateTags(tags) => Some(tags.into_iter().collect()),
                _ => None,
            })
            .collect()
    }

    /// Every `delete_items` call, each as a set
    pub fn deletions(&self) -> Vec<BTreeSet<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DeleteItems(keys) => Some(keys.into_iter().collect()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl TagAwareCache for RecordingCache {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        self.record(Call::GetItem(key.to_string()));
        Ok(CacheItem::miss(key))
    }

    fn get_items(&self, keys: &[String]) -> CacheResult<Vec<CacheItem>> {
        self.record(Call::GetItems(keys.to_vec()));
        Ok(keys.iter().map(|key| CacheItem::miss(key.as_str())).collect())
    }

    fn has_item(&self, key: &str) -> CacheResult<bool> {
        self.record(Call::HasItem(key.to_string()));
        Ok(false)
    }

    fn delete_item(&self, key: &str) -> CacheResult<bool> {
        self.record(Call::DeleteItem(key.to_string()));
        Ok(true)
    }

    fn delete_items(&self, keys: &[String]) -> CacheResult<bool> {
        self.record(Call::DeleteItems(keys.to_vec()));
        Ok(true)
    }

    fn invalidate_tags(&self, tags: &[String]) -> CacheResult<bool> {
        self.record(Call::InvalidateTags(tags.to_vec()));
        if self.fail_invalidation {
            return Err(CacheError::Backend("invalidation refused".to_string()));
        }
        Ok(true)
    }

    fn clear(&self) -> CacheResult<bool> {
        self.record(Call::Clear);
        Ok(true)
    }

    fn save(&self, item: CacheItem) -> CacheResult<bool> {
        self.record(Call::Save(item.key().to_string()));
        Ok(true)
    }

    fn save_deferred(&self, item: CacheItem) -> CacheResult<bool> {
        self.record(Call::SaveDeferred(item.key().to_string()));
        Ok(true)
    }

    fn commit(&self) -> CacheResult<bool> {
        self.record(Call::Commit);
        Ok(true)
    }
}

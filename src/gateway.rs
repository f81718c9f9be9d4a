use std::collections::HashSet;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{GatewayConfig, ReadPolicy, RollbackPolicy};
use crate::error::{CacheError, CacheResult};
use crate::item::CacheItem;
use crate::traits::TagAwareCache;

/// Pending operations recorded at one nesting level
#[derive(Debug, Default)]
struct DeferredLevel {
    tags: Vec<String>,
    keys: Vec<String>,
}

impl DeferredLevel {
    fn clear(&mut self) {
        self.tags.clear();
        self.keys.clear();
    }
}

/// One entry per open transaction; the stack length is the nesting level
#[derive(Debug, Default)]
struct TransactionState {
    levels: Vec<DeferredLevel>,
}

/// Removes duplicates, keeping the first occurrence of each value
fn unique(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// A tag-aware cache proxy that holds back tag invalidations and key
/// deletions while a transaction is open.
///
/// Every call to [`enable_transaction_mode`](Self::enable_transaction_mode)
/// opens a level. Invalidations and deletions issued while a level is open are
/// recorded against it and sent to the wrapped cache, deduplicated, when that
/// level ends through [`disable_transaction_mode`](Self::disable_transaction_mode).
/// Inner levels flush straight to the wrapped cache; they are not merged into
/// the enclosing level. [`clear`](TagAwareCache::clear) is the rollback signal.
///
/// Reads, writes and `commit` always go to the wrapped cache.
pub struct TransactionalCacheGateway<C: TagAwareCache> {
    id: Uuid,
    inner: C,
    config: GatewayConfig,
    state: RwLock<TransactionState>,
}

impl<C: TagAwareCache> TransactionalCacheGateway<C> {
    /// Wraps `inner` using the default policies
    pub fn new(inner: C) -> Self {
        Self::with_config(inner, GatewayConfig::default())
    }

    /// Wraps `inner` using the given policies
    pub fn with_config(inner: C, config: GatewayConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            inner,
            config,
            state: RwLock::new(TransactionState::default()),
        }
    }

    /// Identifier used to correlate this instance's log lines
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The wrapped cache
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Gets the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Number of currently open transaction levels
    pub fn nesting_level(&self) -> usize {
        self.state.read().levels.len()
    }

    /// Returns true while at least one transaction level is open
    pub fn in_transaction(&self) -> bool {
        self.nesting_level() > 0
    }

    /// Tags recorded at the current level, duplicates included
    pub fn pending_invalidations(&self) -> Vec<String> {
        self.state
            .read()
            .levels
            .last()
            .map(|level| level.tags.clone())
            .unwrap_or_default()
    }

    /// Keys recorded at the current level, duplicates included
    pub fn pending_deletions(&self) -> Vec<String> {
        self.state
            .read()
            .levels
            .last()
            .map(|level| level.keys.clone())
            .unwrap_or_default()
    }

    /// Opens a new nesting level with empty logs
    pub fn enable_transaction_mode(&self) {
        let mut state = self.state.write();
        state.levels.push(DeferredLevel::default());
        debug!("Gateway {}: opened transaction level {}", self.id, state.levels.len());
    }

    /// Closes the current level, flushing its deduplicated invalidations and
    /// deletions to the wrapped cache.
    ///
    /// Fails with [`CacheError::UnbalancedTransaction`] when no level is open.
    /// If the tag flush fails the key flush is still attempted and the first
    /// error is returned; the level is closed either way.
    pub fn disable_transaction_mode(&self) -> CacheResult<()> {
        let (level, depth) = {
            let mut state = self.state.write();
            let Some(level) = state.levels.pop() else {
                warn!("Gateway {}: disable_transaction_mode called with no open transaction", self.id);
                return Err(CacheError::UnbalancedTransaction {
                    operation: "disable_transaction_mode",
                });
            };
            (level, state.levels.len() + 1)
        };

        let tags = unique(level.tags);
        let keys = unique(level.keys);
        debug!(
            "Gateway {}: flushing level {} ({} tags, {} keys)",
            self.id,
            depth,
            tags.len(),
            keys.len()
        );

        let invalidated = if tags.is_empty() {
            Ok(true)
        } else {
            self.inner.invalidate_tags(&tags)
        };
        let deleted = if keys.is_empty() {
            Ok(true)
        } else {
            self.inner.delete_items(&keys)
        };

        invalidated?;
        deleted?;
        Ok(())
    }

    fn defer(&self, record: impl FnOnce(&mut DeferredLevel)) -> bool {
        let mut state = self.state.write();
        match state.levels.last_mut() {
            Some(level) => {
                record(level);
                true
            }
            None => false,
        }
    }
}

impl<C: TagAwareCache> TagAwareCache for TransactionalCacheGateway<C> {
    fn get_item(&self, key: &str) -> CacheResult<CacheItem> {
        if !self.in_transaction() {
            return self.inner.get_item(key);
        }

        match self.config.read_policy {
            ReadPolicy::Bypass => {
                debug!("Gateway {}: bypassing cache read of '{}' inside transaction", self.id, key);
                Ok(CacheItem::miss(key))
            }
            ReadPolicy::ExpireAndRefetch => {
                let mut item = self.inner.get_item(key)?;
                item.expires_after(Duration::ZERO);
                self.inner.save(item)?;
                self.inner.get_item(key)
            }
        }
    }

    // TODO: bypass multi-key reads and existence checks inside a transaction
    // the same way get_item does.
    fn get_items(&self, keys: &[String]) -> CacheResult<Vec<CacheItem>> {
        self.inner.get_items(keys)
    }

    fn has_item(&self, key: &str) -> CacheResult<bool> {
        self.inner.has_item(key)
    }

    fn delete_item(&self, key: &str) -> CacheResult<bool> {
        if self.defer(|level| level.keys.push(key.to_string())) {
            debug!("Gateway {}: deferred deletion of '{}'", self.id, key);
            return Ok(true);
        }
        self.inner.delete_item(key)
    }

    fn delete_items(&self, keys: &[String]) -> CacheResult<bool> {
        if self.defer(|level| level.keys.extend_from_slice(keys)) {
            debug!("Gateway {}: deferred deletion of {} keys", self.id, keys.len());
            return Ok(true);
        }
        self.inner.delete_items(keys)
    }

    fn invalidate_tags(&self, tags: &[String]) -> CacheResult<bool> {
        if self.defer(|level| level.tags.extend_from_slice(tags)) {
            debug!("Gateway {}: deferred invalidation of tags {:?}", self.id, tags);
            return Ok(true);
        }
        self.inner.invalidate_tags(tags)
    }

    /// Rolls back the current level: discards deferred operations according
    /// to the rollback policy, closes the level and clears the wrapped cache.
    fn clear(&self) -> CacheResult<bool> {
        {
            let mut state = self.state.write();
            if state.levels.is_empty() {
                warn!("Gateway {}: clear called with no open transaction", self.id);
                return Err(CacheError::UnbalancedTransaction { operation: "clear" });
            }
            if self.config.rollback_policy == RollbackPolicy::DiscardAll {
                state.levels.iter_mut().for_each(DeferredLevel::clear);
            }
            state.levels.pop();
            debug!(
                "Gateway {}: rolled back level {} ({:?})",
                self.id,
                state.levels.len() + 1,
                self.config.rollback_policy
            );
        }
        self.inner.clear()
    }

    fn save(&self, item: CacheItem) -> CacheResult<bool> {
        self.inner.save(item)
    }

    fn save_deferred(&self, item: CacheItem) -> CacheResult<bool> {
        self.inner.save_deferred(item)
    }

    fn commit(&self) -> CacheResult<bool> {
        self.inner.commit()
    }
}

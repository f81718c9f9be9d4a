//! # Transactional Tag Cache
//!
//! This crate provides a transaction-aware proxy over a tag-aware key/value
//! cache. While a database transaction is open, tag invalidations and key
//! deletions are held back per nesting level and applied, deduplicated, when
//! that level commits. A rollback discards them.
//!
//! ## Key Components
//!
//! - `TagAwareCache`: the cache contract the gateway wraps and presents
//! - `TransactionalCacheGateway`: the deferring proxy
//! - `TransactionScope`: RAII guard for one transaction level
//! - `InMemoryTagAwareCache`: bounded in-process tag-aware cache
//! - `InvalidationListener`: applies invalidations published over PostgreSQL NOTIFY
//! - `TransactionAware`: trait for transaction lifecycle notifications (from postgres-unit-of-work)

mod config;
mod error;
mod gateway;
mod item;
mod listener;
mod memory_cache;
mod scope;
mod traits;
#[cfg(feature = "sqlx-listener")]
mod db_init;

pub use config::{GatewayConfig, ReadPolicy, RollbackPolicy};
pub use error::{CacheError, CacheResult};
pub use gateway::TransactionalCacheGateway;
pub use item::CacheItem;
pub use memory_cache::{CacheConfig, CacheStatistics, EvictionPolicy, InMemoryTagAwareCache};
pub use scope::TransactionScope;
pub use traits::TagAwareCache;

// Re-export listener components
pub use listener::{
    CacheInvalidationHandler,
    InvalidationHandler,
    InvalidationListener,
    InvalidationNotification,
    DEFAULT_INVALIDATION_CHANNEL,
};

#[cfg(feature = "sqlx-listener")]
pub use db_init::{cleanup_invalidation_functions, init_invalidation_functions};

// Re-export TransactionAware from postgres-unit-of-work for convenience
pub use postgres_unit_of_work::TransactionAware;

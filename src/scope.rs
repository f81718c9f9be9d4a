//! Transaction boundary signals for [`TransactionalCacheGateway`].
//!
//! A gateway can be driven three ways: by calling
//! `enable_transaction_mode` / `disable_transaction_mode` / `clear` directly,
//! through a [`TransactionScope`] guard, or as a `TransactionAware`
//! participant of a `postgres-unit-of-work` transaction. In the last case the
//! caller opens the level with `enable_transaction_mode` when it registers the
//! gateway, and the unit of work closes it on commit or rollback.

use async_trait::async_trait;
use postgres_unit_of_work::{TransactionAware, TransactionError, TransactionResult};
use tracing::error;

use crate::error::{CacheError, CacheResult};
use crate::gateway::TransactionalCacheGateway;
use crate::traits::TagAwareCache;

/// Guard for one transaction level. Rolls the level back when dropped
/// without an explicit commit or rollback.
#[must_use = "dropping the scope immediately rolls the level back"]
pub struct TransactionScope<'a, C: TagAwareCache> {
    gateway: &'a TransactionalCacheGateway<C>,
    finished: bool,
}

impl<'a, C: TagAwareCache> TransactionScope<'a, C> {
    /// The gateway this scope belongs to
    pub fn gateway(&self) -> &'a TransactionalCacheGateway<C> {
        self.gateway
    }

    /// Closes the level and flushes its deferred operations
    pub fn commit(mut self) -> CacheResult<()> {
        self.finished = true;
        self.gateway.disable_transaction_mode()
    }

    /// Closes the level through the gateway's rollback path
    pub fn rollback(mut self) -> CacheResult<()> {
        self.finished = true;
        self.gateway.clear().map(|_| ())
    }
}

impl<C: TagAwareCache> Drop for TransactionScope<'_, C> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.gateway.clear() {
            error!("Gateway {}: implicit rollback failed: {}", self.gateway.id(), e);
        }
    }
}

impl<C: TagAwareCache> TransactionalCacheGateway<C> {
    /// Opens a transaction level and returns its guard
    pub fn begin(&self) -> TransactionScope<'_, C> {
        self.enable_transaction_mode();
        TransactionScope {
            gateway: self,
            finished: false,
        }
    }
}

#[async_trait]
impl<C> TransactionAware for TransactionalCacheGateway<C>
where
    C: TagAwareCache,
{
    async fn on_commit(&self) -> TransactionResult<()> {
        self.disable_transaction_mode()
            .map_err(|e| TransactionError::from(CacheError::CommitFailed(e.to_string())))
    }

    async fn on_rollback(&self) -> TransactionResult<()> {
        self.clear()
            .map(|_| ())
            .map_err(|e| TransactionError::from(CacheError::RollbackFailed(e.to_string())))
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::traits::TagAwareCache;

/// The default channel name for cache invalidation notifications
pub const DEFAULT_INVALIDATION_CHANNEL: &str = "cache_invalidation";

/// Notification payload structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvalidationNotification {
    /// The cache pool the invalidation targets
    pub pool: String,
    /// Tags to invalidate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Keys to delete
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Handler trait for invalidation notifications
#[async_trait]
pub trait InvalidationHandler: Send + Sync {
    /// Handle an invalidation notification
    async fn handle_notification(&self, notification: InvalidationNotification);

    /// Get the pool name this handler is responsible for
    fn pool_name(&self) -> &str;
}

/// Applies notifications to a tag-aware cache.
///
/// Point this at the shared cache, not at a request's gateway: a gateway with
/// an open transaction would defer the invalidation until that transaction
/// ends.
pub struct CacheInvalidationHandler<C: TagAwareCache> {
    pool_name: String,
    cache: Arc<C>,
}

impl<C: TagAwareCache> CacheInvalidationHandler<C> {
    /// Create a new handler for the given cache
    pub fn new(pool_name: String, cache: Arc<C>) -> Self {
        Self { pool_name, cache }
    }
}

#[async_trait]
impl<C: TagAwareCache + 'static> InvalidationHandler for CacheInvalidationHandler<C> {
    async fn handle_notification(&self, notification: InvalidationNotification) {
        debug!(
            "Handling invalidation for pool '{}': tags={:?}, keys={:?}",
            notification.pool, notification.tags, notification.keys
        );

        if notification.tags.is_empty() && notification.keys.is_empty() {
            warn!("Empty invalidation received for pool '{}'", notification.pool);
            return;
        }

        if !notification.tags.is_empty() {
            if let Err(e) = self.cache.invalidate_tags(&notification.tags) {
                error!(
                    "Failed to invalidate tags for pool '{}': {}",
                    notification.pool, e
                );
            }
        }

        if !notification.keys.is_empty() {
            if let Err(e) = self.cache.delete_items(&notification.keys) {
                error!(
                    "Failed to delete keys for pool '{}': {}",
                    notification.pool, e
                );
            }
        }
    }

    fn pool_name(&self) -> &str {
        &self.pool_name
    }
}

/// Listener for PostgreSQL notifications that dispatches to registered invalidation handlers
pub struct InvalidationListener {
    handlers: HashMap<String, Arc<dyn InvalidationHandler>>,
    channel: String,
}

impl InvalidationListener {
    /// Create a new listener with the default channel
    pub fn new() -> Self {
        Self::with_channel(DEFAULT_INVALIDATION_CHANNEL.to_string())
    }

    /// Create a new listener with a custom channel name
    pub fn with_channel(channel: String) -> Self {
        Self {
            handlers: HashMap::new(),
            channel,
        }
    }

    /// Register a handler for a specific pool
    pub fn register_handler(&mut self, handler: Arc<dyn InvalidationHandler>) {
        let pool_name = handler.pool_name().to_string();
        debug!("Registering handler for pool '{}'", pool_name);
        self.handlers.insert(pool_name, handler);
    }

    /// Process a single notification payload
    ///
    /// This method can be called from your own notification polling loop.
    ///
    /// # Example
    /// ```ignore
    /// while let Some(notification) = get_notification().await {
    ///     listener.process_notification(&notification.payload()).await;
    /// }
    /// ```
    pub async fn process_notification(&self, payload: &str) {
        match serde_json::from_str::<InvalidationNotification>(payload) {
            Ok(notification) => {
                if let Some(handler) = self.handlers.get(&notification.pool) {
                    handler.handle_notification(notification).await;
                } else {
                    debug!("No handler registered for pool '{}'", notification.pool);
                }
            }
            Err(e) => {
                error!("Failed to parse notification payload: {}", e);
                debug!("Payload was: {}", payload);
            }
        }
    }

    /// Get the channel name this listener is using
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Starts listening for notifications from PostgreSQL and processes them.
    ///
    /// Runs until re-subscribing after a reconnect fails, so it is meant to be
    /// spawned as a background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connection or LISTEN fails, or if
    /// LISTEN fails after a reconnect.
    #[cfg(feature = "sqlx-listener")]
    pub async fn listen(&self, pool: &sqlx::PgPool) -> Result<(), sqlx::Error> {
        let mut listener = sqlx::postgres::PgListener::connect_with(pool).await?;
        listener.listen(&self.channel).await?;
        debug!("Started listening on channel '{}'", self.channel);

        loop {
            match listener.recv().await {
                Ok(notification) => {
                    self.process_notification(notification.payload()).await;
                }
                Err(e) => {
                    error!("Error receiving notification: {}", e);
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

                    match sqlx::postgres::PgListener::connect_with(pool).await {
                        Ok(new_listener) => {
                            listener = new_listener;
                            if let Err(listen_err) = listener.listen(&self.channel).await {
                                error!(
                                    "Failed to re-listen on channel '{}': {}",
                                    self.channel, listen_err
                                );
                                return Err(listen_err);
                            }
                            debug!("Reconnected and listening on channel '{}'", self.channel);
                        }
                        Err(connect_err) => {
                            error!("Failed to reconnect to database: {}", connect_err);
                        }
                    }
                }
            }
        }
    }
}

impl Default for InvalidationListener {
    fn default() -> Self {
        Self::new()
    }
}

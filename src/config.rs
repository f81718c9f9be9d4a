use serde::Deserialize;

/// What a rollback (`clear`) does with the deferred logs of open levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Discard the pending invalidations and deletions of every open level
    #[default]
    DiscardAll,
    /// Discard only the innermost level; outer levels still flush their own
    /// operations when they end
    DiscardInnermost,
}

/// How single-item reads behave while a transaction is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Report a miss without touching the underlying cache
    #[default]
    Bypass,
    /// Expire the stored item, save it back, and read it again
    ExpireAndRefetch,
}

/// Configuration for TransactionalCacheGateway
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub rollback_policy: RollbackPolicy,
    pub read_policy: ReadPolicy,
}

impl GatewayConfig {
    /// Create a configuration with the default policies
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rollback policy
    pub fn with_rollback_policy(mut self, policy: RollbackPolicy) -> Self {
        self.rollback_policy = policy;
        self
    }

    /// Set the read policy
    pub fn with_read_policy(mut self, policy: ReadPolicy) -> Self {
        self.read_policy = policy;
        self
    }
}

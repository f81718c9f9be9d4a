use postgres_unit_of_work::TransactionError;

/// Error type for cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Unbalanced transaction boundary: {operation} called with no open transaction")]
    UnbalancedTransaction { operation: &'static str },

    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),

    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Transaction commit failed: {0}")]
    CommitFailed(String),

    #[error("Transaction rollback failed: {0}")]
    RollbackFailed(String),
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Conversion from CacheError to TransactionError
impl From<CacheError> for TransactionError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::CommitFailed(msg) => TransactionError::CommitFailed(msg),
            CacheError::RollbackFailed(msg) => TransactionError::RollbackFailed(msg),
            other => TransactionError::CommitFailed(format!("Cache error: {other}")),
        }
    }
}

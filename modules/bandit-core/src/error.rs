/// Result type alias for bandit operations.
pub type Result<T> = std::result::Result<T, BanditError>;

#[derive(Debug, thiserror::Error)]
pub enum BanditError {
    /// Transport/connection failure or backend outage. Retryable by the
    /// caller; the failed operation left no partial state behind.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),

    /// Empty domain or arm identifier, or a non-positive hit delta.
    /// Rejected before any storage access.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

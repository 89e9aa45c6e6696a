//! Error types for the index crate.

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Medium operation failed.
    #[error("store error: {0}")]
    Store(#[from] datacfg_store::StoreError),

    /// The index document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;

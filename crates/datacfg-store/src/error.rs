/// Errors from medium operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The medium key is not a safe relative path.
    #[error("invalid medium key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed during a listing.
    #[error("scan failed: {0}")]
    Scan(#[from] walkdir::Error),

    /// Storage backend is read-only or otherwise unavailable.
    #[error("medium unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for medium operations.
pub type StoreResult<T> = Result<T, StoreError>;

use crate::error::StoreResult;

/// Key-addressed document store.
///
/// All implementations must satisfy these invariants:
/// - `write` replaces the document atomically: a concurrent `read` sees the
///   old bytes or the new bytes, never a mix.
/// - Missing keys are reported as `Ok(None)` / `Ok(false)`, not errors.
/// - Keys are validated with [`validate_medium_key`](crate::validate_medium_key).
/// - All I/O errors are propagated, never silently ignored.
pub trait ContentStore: Send + Sync {
    /// Read a document.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or replace a document.
    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Check whether a document exists.
    fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Delete a document. Returns `true` if it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// All keys starting with `prefix`, sorted.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

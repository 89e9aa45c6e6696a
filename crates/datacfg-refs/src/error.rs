//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur while parsing or following a field path.
///
/// These are always scoped to a single reference entry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    /// The field path does not follow the `name` / `name[i]` grammar.
    #[error("invalid field path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A path step names a field the type does not persist.
    #[error("field {field:?} not found while following {path:?}")]
    FieldNotFound { path: String, field: String },

    /// An intermediate optional object is absent.
    #[error("field {field:?} is empty while following {path:?}")]
    NullIntermediate { path: String, field: String },

    /// A `name[i]` step addressed a field that is not a sequence.
    #[error("field {field:?} is not a sequence in {path:?}")]
    NotASequence { path: String, field: String },

    /// A plain step addressed a field that holds no nested object.
    #[error("field {field:?} is not a nested object in {path:?}")]
    NotNested { path: String, field: String },

    /// A `name[i]` step is past the end of the sequence.
    #[error("index {index} out of range (len {len}) in {path:?}")]
    IndexOutOfRange { path: String, index: usize, len: usize },

    /// The final step does not address an external-resource field.
    #[error("{path:?} does not address a resource field")]
    NotAResourceField { path: String },
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;

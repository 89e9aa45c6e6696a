use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("expected a JSON object at the top level")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

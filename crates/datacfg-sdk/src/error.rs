use datacfg_types::{ConfigKey, KeyScheme};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("config not found: {0}")]
    NotFound(ConfigKey),

    #[error("config already exists: {0}")]
    DuplicateKey(ConfigKey),

    #[error("key {key} does not fit the {scheme} scheme: {reason}")]
    SchemeViolation {
        key: ConfigKey,
        scheme: KeyScheme,
        reason: String,
    },

    #[error("invalid name: {0}")]
    InvalidName(#[from] datacfg_types::TypeError),

    #[error("codec error: {0}")]
    Codec(#[from] datacfg_codec::CodecError),

    #[error("medium error: {0}")]
    Medium(#[from] datacfg_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] datacfg_index::IndexError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type SdkResult<T> = Result<T, SdkError>;

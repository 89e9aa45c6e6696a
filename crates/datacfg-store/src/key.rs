use crate::error::{StoreError, StoreResult};

/// Check that `key` is a relative, `/`-separated path with no empty,
/// `.` or `..` segments.
pub fn validate_medium_key(key: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if key.chars().any(|c| c.is_control() || c == '\\') {
        return Err(invalid("key contains a control character or backslash"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid("key contains an empty segment")),
            "." | ".." => return Err(invalid("key contains a relative segment")),
            _ => {}
        }
    }
    Ok(())
}

//! Name validation for config names and type names.
//!
//! Composite keys are built as `{type}_{name}` and end up as file names on
//! disk-backed mediums, so both halves must be file-name safe.
//!
//! Valid config names:
//! - Must be non-empty
//! - Must not contain control characters, `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`
//! - Must not contain whitespace other than a plain space
//! - Must not contain `..`
//! - Must not start with `.` or a space, must not end with `.` or a space
//!
//! Valid type names:
//! - Must be non-empty and start with an ASCII letter
//! - May contain only ASCII alphanumerics and `.`, with no empty `.` segments
//!
//! Type names never contain `_`, so the first `_` of a composite key always
//! separates the type from the name.

use crate::error::TypeError;

/// Characters that are forbidden anywhere in a config name.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Validate a human-readable config name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use datacfg_types::names::validate_config_name;
///
/// assert!(validate_config_name("Sword of Dawn").is_ok());
/// assert!(validate_config_name("").is_err());
/// assert!(validate_config_name("../escape").is_err());
/// ```
pub fn validate_config_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty".into()));
    }

    if let Some(ch) = name.chars().find(|c| c.is_control()) {
        return Err(invalid(format!("contains control character: {ch:?}")));
    }

    if let Some(ch) = name.chars().find(|c| c.is_whitespace() && *c != ' ') {
        return Err(invalid(format!("contains whitespace other than a space: {ch:?}")));
    }

    for ch in FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(invalid(format!("contains forbidden character: {ch:?}")));
        }
    }

    if name.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }

    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid("must not start or end with '.'".into()));
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err(invalid("must not start or end with a space".into()));
    }

    Ok(())
}

/// Validate a config type name, returning `Ok(())` if valid.
pub fn validate_type_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidTypeName {
        name: name.to_string(),
        reason,
    };

    let Some(first) = name.chars().next() else {
        return Err(invalid("type name must not be empty".into()));
    };
    if !first.is_ascii_alphabetic() {
        return Err(invalid("must start with an ASCII letter".into()));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.'))
    {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") || name.ends_with('.') {
        return Err(invalid("segments between '.' must not be empty".into()));
    }
    Ok(())
}

//! Field path grammar.
//!
//! A field path addresses one field inside a config object graph:
//!
//! ```text
//! path    = step ( "." step )*
//! step    = name | name "[" index "]"
//! name    = ( ALPHA | "_" ) ( ALNUM | "_" )*
//! index   = DIGIT+
//! ```
//!
//! `loot.drops[2].icon` reads: field `loot`, then element 2 of sequence
//! field `drops`, then field `icon`.

use std::fmt;

use crate::error::{RefError, Result};

/// One step of a [`FieldPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Descend into (or set) the named field.
    Field(String),
    /// Descend into (or set) element `index` of the named sequence field.
    Element(String, usize),
}

impl PathStep {
    /// The field name this step addresses.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Element(name, _) => name,
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Element(name, index) => write!(f, "{name}[{index}]"),
        }
    }
}

/// A parsed, non-empty field path.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldPath {
    steps: Vec<PathStep>,
}

impl FieldPath {
    /// A one-step path naming a field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            steps: vec![PathStep::Field(name.into())],
        }
    }

    /// A one-step path naming an element of a sequence field.
    pub fn element(name: impl Into<String>, index: usize) -> Self {
        Self {
            steps: vec![PathStep::Element(name.into(), index)],
        }
    }

    /// Extend this path with a field step.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Field(name.into()));
        Self { steps }
    }

    /// Extend this path with an element step.
    pub fn child_element(&self, name: impl Into<String>, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(PathStep::Element(name.into(), index));
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps (always at least one).
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Parse a dotted path string.
    ///
    /// # Examples
    ///
    /// ```
    /// use datacfg_refs::path::{FieldPath, PathStep};
    ///
    /// let path = FieldPath::parse("items[2].sprite").unwrap();
    /// assert_eq!(path.steps()[0], PathStep::Element("items".into(), 2));
    /// assert!(FieldPath::parse("items[x]").is_err());
    /// ```
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: String| RefError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path must not be empty".into()));
        }

        let mut steps = Vec::new();
        for segment in path.split('.') {
            steps.push(parse_step(segment).map_err(invalid)?);
        }
        Ok(Self { steps })
    }
}

fn parse_step(segment: &str) -> std::result::Result<PathStep, String> {
    let (name, index) = match segment.find('[') {
        None => (segment, None),
        Some(open) => {
            let rest = &segment[open + 1..];
            let digits = rest
                .strip_suffix(']')
                .ok_or_else(|| format!("segment {segment:?} has an unterminated index"))?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("segment {segment:?} has a non-numeric index"));
            }
            let index: usize = digits
                .parse()
                .map_err(|e| format!("segment {segment:?}: {e}"))?;
            (&segment[..open], Some(index))
        }
    };

    validate_field_name(name).map_err(|reason| format!("segment {segment:?}: {reason}"))?;

    Ok(match index {
        Some(index) => PathStep::Element(name.to_string(), index),
        None => PathStep::Field(name.to_string()),
    })
}

fn validate_field_name(name: &str) -> std::result::Result<(), String> {
    let Some(first) = name.chars().next() else {
        return Err("field name must not be empty".into());
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!("field name must not start with {first:?}"));
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        return Err(format!("field name contains forbidden character: {ch:?}"));
    }
    Ok(())
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for FieldPath {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

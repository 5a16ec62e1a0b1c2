//! Property paths into a JSON response body.
//!
//! A path is a dotted list of object keys with optional array indices:
//! `data`, `data.id`, `data[0].email`, `[2]`. A leading `$` or `$.` is
//! accepted so JSONPath-style paths work too. The empty path is the body root.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member access.
    Key(String),
    /// Array element access.
    Index(usize),
}

/// A parsed, validated property path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// The body root.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            raw: String::new(),
            segments: Vec::new(),
        }
    }

    /// Parses a property path.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPropertyPath` for empty segments, unclosed
    /// brackets or non-numeric indices.
    pub fn parse(path: &str) -> DomainResult<Self> {
        let trimmed = path.trim();
        let body = trimmed
            .strip_prefix("$.")
            .or_else(|| trimmed.strip_prefix('$'))
            .unwrap_or(trimmed);

        let invalid = |reason: &str| DomainError::InvalidPropertyPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = body.chars().peekable();
        // After `]` only `.` or `[` may follow.
        let mut after_index = false;

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if key.is_empty() && !after_index {
                        return Err(invalid("empty key"));
                    }
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    if chars.peek().is_none() {
                        return Err(invalid("trailing '.'"));
                    }
                    after_index = false;
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == ']' {
                            closed = true;
                            break;
                        }
                        digits.push(c);
                    }
                    if !closed {
                        return Err(invalid("unclosed '['"));
                    }
                    let index = digits
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| invalid(&format!("invalid array index '{digits}'")))?;
                    segments.push(PathSegment::Index(index));
                    after_index = true;
                }
                ']' => return Err(invalid("unexpected ']'")),
                _ => {
                    if after_index {
                        return Err(invalid("expected '.' or '[' after index"));
                    }
                    key.push(ch);
                }
            }
        }

        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            segments,
        })
    }

    /// Returns true if this path addresses the body root.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Walks `value` along this path.
    ///
    /// Returns `None` as soon as a key is absent, an index is out of range,
    /// or a segment is applied to the wrong JSON type.
    #[must_use]
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                PathSegment::Key(key) => current.as_object()?.get(key),
                PathSegment::Index(index) => current.as_array()?.get(*index),
            })
    }

    /// Returns a new path with `index` appended.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self {
            raw: format!("{}[{index}]", self.raw),
            segments,
        }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            write!(f, "<body>")
        } else {
            write!(f, "{}", self.raw)
        }
    }
}

impl FromStr for PropertyPath {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PropertyPath {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Self::parse(&value)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> Self {
        path.raw
    }
}

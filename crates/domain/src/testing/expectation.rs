//! Expectations evaluated against a response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::path::PropertyPath;

/// A single checkable condition against a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expectation {
    /// Response status must equal `code` exactly.
    StatusEquals {
        /// Expected status code.
        code: u16,
    },
    /// Response status must (or must not) fall in a named class.
    StatusClass {
        /// The class to check.
        class: StatusClass,
        /// Whether the status is expected to be in the class.
        #[serde(default = "default_true")]
        expected: bool,
    },
    /// Header must exist and its value must match a regex.
    HeaderMatches {
        /// Header name (case-insensitive).
        name: String,
        /// Regex pattern to match.
        pattern: String,
    },
    /// Content-Type must be a JSON media type.
    IsJson,
    /// Property must exist and optionally equal a value.
    BodyHasProperty {
        /// Path to the property.
        path: PropertyPath,
        /// Expected value; presence only when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expected: Option<Value>,
        /// How `expected` is compared.
        #[serde(default)]
        mode: ComparisonMode,
    },
    /// Property must be of the given JSON type.
    PropertyIsType {
        /// Path to the property.
        path: PropertyPath,
        /// Expected JSON type.
        kind: JsonKind,
    },
    /// String property must contain a substring, or array property an element.
    PropertyContains {
        /// Path to the property.
        path: PropertyPath,
        /// Substring (for strings) or element (for arrays).
        needle: Value,
    },
    /// Property must have the given length.
    PropertyHasLength {
        /// Path to the property.
        path: PropertyPath,
        /// Expected length (chars, elements or keys).
        length: usize,
    },
    /// Body (or sub-field) must be a JSON array.
    BodyIsArray {
        /// Sub-field; the body root when absent.
        #[serde(default)]
        path: PropertyPath,
    },
    /// Body (or sub-field) must be a JSON object.
    BodyIsObject {
        /// Sub-field; the body root when absent.
        #[serde(default)]
        path: PropertyPath,
    },
    /// Body must be absent, `{}`, `[]` or `""`.
    BodyIsEmpty,
    /// Array element at `index` must have exactly `keys`.
    ArrayElementHasKeys {
        /// Path to the array; the body root when absent.
        #[serde(default)]
        path: PropertyPath,
        /// Element index.
        index: usize,
        /// The exact key set.
        keys: Vec<String>,
    },
    /// Object at `path` must have exactly `keys`.
    ObjectHasKeys {
        /// Path to the object; the body root when absent.
        #[serde(default)]
        path: PropertyPath,
        /// The exact key set.
        keys: Vec<String>,
    },
}

const fn default_true() -> bool {
    true
}

impl Expectation {
    /// Status must equal `code`.
    #[must_use]
    pub const fn status(code: u16) -> Self {
        Self::StatusEquals { code }
    }

    /// Status must be in `class`.
    #[must_use]
    pub const fn status_is(class: StatusClass) -> Self {
        Self::StatusClass {
            class,
            expected: true,
        }
    }

    /// Status must not be in `class`.
    #[must_use]
    pub const fn status_is_not(class: StatusClass) -> Self {
        Self::StatusClass {
            class,
            expected: false,
        }
    }

    /// Header `name` must match `pattern`.
    #[must_use]
    pub fn header(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::HeaderMatches {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Property must be present with any value.
    #[must_use]
    pub const fn has_property(path: PropertyPath) -> Self {
        Self::BodyHasProperty {
            path,
            expected: None,
            mode: ComparisonMode::Strict,
        }
    }

    /// Property must strictly equal `expected`.
    #[must_use]
    pub fn property_eq(path: PropertyPath, expected: impl Into<Value>) -> Self {
        Self::BodyHasProperty {
            path,
            expected: Some(expected.into()),
            mode: ComparisonMode::Strict,
        }
    }

    /// Property must loosely equal `expected`.
    #[must_use]
    pub fn property_loose_eq(path: PropertyPath, expected: impl Into<Value>) -> Self {
        Self::BodyHasProperty {
            path,
            expected: Some(expected.into()),
            mode: ComparisonMode::Loose,
        }
    }

    /// Property must be of JSON type `kind`.
    #[must_use]
    pub const fn property_type(path: PropertyPath, kind: JsonKind) -> Self {
        Self::PropertyIsType { path, kind }
    }

    /// Property must contain `needle`.
    #[must_use]
    pub fn property_contains(path: PropertyPath, needle: impl Into<Value>) -> Self {
        Self::PropertyContains {
            path,
            needle: needle.into(),
        }
    }

    /// Property must have `length` chars, elements or keys.
    #[must_use]
    pub const fn property_length(path: PropertyPath, length: usize) -> Self {
        Self::PropertyHasLength { path, length }
    }

    /// Value at `path` must be an array.
    #[must_use]
    pub const fn is_array(path: PropertyPath) -> Self {
        Self::BodyIsArray { path }
    }

    /// Value at `path` must be an object.
    #[must_use]
    pub const fn is_object(path: PropertyPath) -> Self {
        Self::BodyIsObject { path }
    }

    /// Element `index` of the array at `path` must have exactly `keys`.
    #[must_use]
    pub fn element_keys<I, S>(path: PropertyPath, index: usize, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ArrayElementHasKeys {
            path,
            index,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Object at `path` must have exactly `keys`.
    #[must_use]
    pub fn object_keys<I, S>(path: PropertyPath, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ObjectHasKeys {
            path,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if checking this expectation requires a JSON body.
    #[must_use]
    pub const fn requires_json(&self) -> bool {
        matches!(
            self,
            Self::BodyHasProperty { .. }
                | Self::PropertyIsType { .. }
                | Self::PropertyContains { .. }
                | Self::PropertyHasLength { .. }
                | Self::BodyIsArray { .. }
                | Self::BodyIsObject { .. }
                | Self::ArrayElementHasKeys { .. }
                | Self::ObjectHasKeys { .. }
        )
    }

    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { code } => format!("Status code = {code}"),
            Self::StatusClass {
                class,
                expected: true,
            } => format!("Status is {}", class.label()),
            Self::StatusClass {
                class,
                expected: false,
            } => format!("Status is not {}", class.label()),
            Self::HeaderMatches { name, pattern } => {
                format!("Header '{name}' matches /{pattern}/")
            }
            Self::IsJson => "Response is JSON".to_string(),
            Self::BodyHasProperty {
                path,
                expected: Some(v),
                mode,
            } => format!("Property {path} {} {v}", mode.symbol()),
            Self::BodyHasProperty {
                path,
                expected: None,
                ..
            } => format!("Property {path} exists"),
            Self::PropertyIsType { path, kind } => format!("Property {path} is {}", kind.label()),
            Self::PropertyContains { path, needle } => format!("Property {path} contains {needle}"),
            Self::PropertyHasLength { path, length } => {
                format!("Property {path} has length {length}")
            }
            Self::BodyIsArray { path } => format!("{path} is an array"),
            Self::BodyIsObject { path } => format!("{path} is an object"),
            Self::BodyIsEmpty => "Body is empty".to_string(),
            Self::ArrayElementHasKeys { path, index, keys } => {
                format!("{} has keys [{}]", path.index(*index), keys.join(", "))
            }
            Self::ObjectHasKeys { path, keys } => format!("{path} has keys [{}]", keys.join(", ")),
        }
    }
}

/// Named status classes, mirroring the `ok` / `notFound` / `badRequest` /
/// `noContent` response flags of common HTTP assertion libraries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    /// Any 2xx status.
    Ok,
    /// 204.
    NoContent,
    /// 400.
    BadRequest,
    /// 404.
    NotFound,
    /// Any 4xx status.
    ClientError,
    /// Any 5xx status.
    ServerError,
}

impl StatusClass {
    /// Returns true if `status` belongs to this class.
    #[must_use]
    pub const fn contains(self, status: u16) -> bool {
        match self {
            Self::Ok => status >= 200 && status < 300,
            Self::NoContent => status == 204,
            Self::BadRequest => status == 400,
            Self::NotFound => status == 404,
            Self::ClientError => status >= 400 && status < 500,
            Self::ServerError => status >= 500 && status < 600,
        }
    }

    /// Short label used in descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok (2xx)",
            Self::NoContent => "no content (204)",
            Self::BadRequest => "bad request (400)",
            Self::NotFound => "not found (404)",
            Self::ClientError => "client error (4xx)",
            Self::ServerError => "server error (5xx)",
        }
    }
}

/// How an expected property value is compared with the actual one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Same JSON type and value. Numbers compare by value, so `3 == 3.0`.
    #[default]
    Strict,
    /// Loose equality: numbers, numeric strings and booleans coerce to a
    /// number before comparing; `null` only equals `null`.
    Loose,
}

impl ComparisonMode {
    /// Get the symbol for this mode.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Strict => "===",
            Self::Loose => "==",
        }
    }
}

/// JSON value types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JsonKind {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl JsonKind {
    /// Returns the kind of `value`.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Short label used in descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::String => "a string",
            Self::Array => "an array",
            Self::Object => "an object",
        }
    }
}

//! Expectation evaluator implementation.
//!
//! Checks expectations against HTTP responses and produces expectation
//! results. Failures are data: nothing here returns `Err`.

use std::collections::BTreeSet;

use regex::Regex;
use reqcheck_application::ports::ResponseEvaluator;
use reqcheck_domain::{
    ComparisonMode, Expectation, ExpectationResult, JsonKind, PropertyPath, ResponseSpec,
    StatusClass,
};
use serde_json::Value;

/// Maximum body excerpt shown in a diagnostic.
const PREVIEW_CHARS: usize = 100;

/// Evaluates expectations against a received response.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectationEvaluator;

impl ExpectationEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn check_status(
        expectation: &Expectation,
        response: &ResponseSpec,
        code: u16,
    ) -> ExpectationResult {
        let actual = response.status.to_string();
        if response.status == code {
            ExpectationResult::pass_with_value(expectation.clone(), actual)
        } else {
            ExpectationResult::mismatch(expectation.clone(), code.to_string(), actual)
        }
    }

    fn check_status_class(
        expectation: &Expectation,
        response: &ResponseSpec,
        class: StatusClass,
        expected: bool,
    ) -> ExpectationResult {
        let actual = response.status.to_string();
        if class.contains(response.status) == expected {
            return ExpectationResult::pass_with_value(expectation.clone(), actual);
        }
        let wanted = if expected {
            class.label().to_string()
        } else {
            format!("not {}", class.label())
        };
        ExpectationResult::mismatch(expectation.clone(), wanted, actual)
    }

    fn check_header_matches(
        expectation: &Expectation,
        response: &ResponseSpec,
        name: &str,
        pattern: &str,
    ) -> ExpectationResult {
        let values: Vec<&str> = response.header_values(name).collect();
        if values.is_empty() {
            return ExpectationResult::fail(
                expectation.clone(),
                format!("Header '{name}' not found"),
            );
        }

        let regex = match Regex::new(pattern) {
            Ok(regex) => regex,
            Err(e) => {
                return ExpectationResult::fail(
                    expectation.clone(),
                    format!("Invalid regex pattern '{pattern}': {e}"),
                );
            }
        };

        // A repeated header passes when any one of its values matches.
        match values.iter().copied().find(|value| regex.is_match(value)) {
            Some(matched) => ExpectationResult::pass_with_value(expectation.clone(), matched),
            None => ExpectationResult::mismatch(
                expectation.clone(),
                format!("/{pattern}/"),
                values.join(", "),
            ),
        }
    }

    fn check_is_json(expectation: &Expectation, response: &ResponseSpec) -> ExpectationResult {
        let Some(content_type) = response.content_type.as_deref() else {
            return ExpectationResult::mismatch(
                expectation.clone(),
                "a JSON content type",
                "no Content-Type header",
            );
        };

        let is_json = content_type
            .parse::<mime::Mime>()
            .is_ok_and(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON));

        if is_json {
            ExpectationResult::pass_with_value(expectation.clone(), content_type)
        } else {
            ExpectationResult::mismatch(expectation.clone(), "a JSON content type", content_type)
        }
    }

    fn check_body_is_empty(
        expectation: &Expectation,
        response: &ResponseSpec,
    ) -> ExpectationResult {
        if response.is_body_blank() {
            return ExpectationResult::pass(expectation.clone());
        }

        let empty = response.json().is_ok_and(|json| match json {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(s) => s.is_empty(),
            _ => false,
        });

        if empty {
            ExpectationResult::pass(expectation.clone())
        } else {
            ExpectationResult::mismatch(
                expectation.clone(),
                "empty body",
                response.body_preview(PREVIEW_CHARS),
            )
        }
    }

    /// Runs a check that needs the parsed body, failing the expectation when
    /// the body is not JSON.
    fn with_json<F>(
        expectation: &Expectation,
        response: &ResponseSpec,
        check: F,
    ) -> ExpectationResult
    where
        F: FnOnce(&Value) -> ExpectationResult,
    {
        match response.json() {
            Ok(json) => check(&json),
            Err(e) => ExpectationResult::fail(
                expectation.clone(),
                format!(
                    "Malformed response: body is not valid JSON ({e}): {}",
                    response.body_preview(PREVIEW_CHARS)
                ),
            ),
        }
    }

    fn lookup<'a>(
        expectation: &Expectation,
        json: &'a Value,
        path: &PropertyPath,
    ) -> Result<&'a Value, ExpectationResult> {
        path.resolve(json).ok_or_else(|| {
            ExpectationResult::fail(expectation.clone(), format!("Property {path} not found"))
        })
    }

    fn check_property(
        expectation: &Expectation,
        json: &Value,
        path: &PropertyPath,
        expected: Option<&Value>,
        mode: ComparisonMode,
    ) -> ExpectationResult {
        let actual = match Self::lookup(expectation, json, path) {
            Ok(actual) => actual,
            Err(result) => return result,
        };

        let Some(expected) = expected else {
            return ExpectationResult::pass_with_value(expectation.clone(), actual.to_string());
        };

        let equal = match mode {
            ComparisonMode::Strict => strict_eq(actual, expected),
            ComparisonMode::Loose => loose_eq(actual, expected),
        };

        if equal {
            ExpectationResult::pass_with_value(expectation.clone(), actual.to_string())
        } else {
            ExpectationResult::mismatch(
                expectation.clone(),
                expected.to_string(),
                actual.to_string(),
            )
        }
    }

    fn check_kind(
        expectation: &Expectation,
        json: &Value,
        path: &PropertyPath,
        kind: JsonKind,
    ) -> ExpectationResult {
        match Self::lookup(expectation, json, path) {
            Ok(actual) if JsonKind::of(actual) == kind => {
                ExpectationResult::pass_with_value(expectation.clone(), kind.label())
            }
            Ok(actual) => ExpectationResult::mismatch(
                expectation.clone(),
                kind.label(),
                JsonKind::of(actual).label(),
            ),
            Err(result) => result,
        }
    }

    fn check_contains(
        expectation: &Expectation,
        json: &Value,
        path: &PropertyPath,
        needle: &Value,
    ) -> ExpectationResult {
        let actual = match Self::lookup(expectation, json, path) {
            Ok(actual) => actual,
            Err(result) => return result,
        };

        let contains = match (actual, needle) {
            (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
            (Value::Array(items), needle) => items.iter().any(|item| strict_eq(item, needle)),
            (Value::Object(map), Value::Object(subset)) => subset
                .iter()
                .all(|(k, v)| map.get(k).is_some_and(|actual| strict_eq(actual, v))),
            _ => {
                return ExpectationResult::fail(
                    expectation.clone(),
                    format!(
                        "Property {path} is {}, cannot contain {needle}",
                        JsonKind::of(actual).label()
                    ),
                );
            }
        };

        if contains {
            ExpectationResult::pass_with_value(expectation.clone(), actual.to_string())
        } else {
            ExpectationResult::mismatch(
                expectation.clone(),
                format!("to contain {needle}"),
                actual.to_string(),
            )
        }
    }

    fn check_length(
        expectation: &Expectation,
        json: &Value,
        path: &PropertyPath,
        length: usize,
    ) -> ExpectationResult {
        let actual = match Self::lookup(expectation, json, path) {
            Ok(actual) => actual,
            Err(result) => return result,
        };

        let actual_length = match actual {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            other => {
                return ExpectationResult::fail(
                    expectation.clone(),
                    format!(
                        "Property {path} is {}, which has no length",
                        JsonKind::of(other).label()
                    ),
                );
            }
        };

        if actual_length == length {
            ExpectationResult::pass_with_value(expectation.clone(), actual_length.to_string())
        } else {
            ExpectationResult::mismatch(
                expectation.clone(),
                length.to_string(),
                actual_length.to_string(),
            )
        }
    }

    fn check_element_keys(
        expectation: &Expectation,
        json: &Value,
        path: &PropertyPath,
        index: usize,
        keys: &[String],
    ) -> ExpectationResult {
        let items = match Self::lookup(expectation, json, path) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                return ExpectationResult::mismatch(
                    expectation.clone(),
                    JsonKind::Array.label(),
                    JsonKind::of(other).label(),
                );
            }
            Err(result) => return result,
        };

        match items.get(index) {
            Some(element) => Self::check_keys(expectation, element, keys),
            None => ExpectationResult::fail(
                expectation.clone(),
                format!(
                    "{} not found: array has {} element(s)",
                    path.index(index),
                    items.len()
                ),
            ),
        }
    }

    fn check_keys(expectation: &Expectation, value: &Value, keys: &[String]) -> ExpectationResult {
        let Value::Object(map) = value else {
            return ExpectationResult::mismatch(
                expectation.clone(),
                JsonKind::Object.label(),
                JsonKind::of(value).label(),
            );
        };

        let expected: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        let actual: BTreeSet<&str> = map.keys().map(String::as_str).collect();

        if expected == actual {
            ExpectationResult::pass(expectation.clone())
        } else {
            ExpectationResult::mismatch(expectation.clone(), key_list(&expected), key_list(&actual))
        }
    }
}

impl ResponseEvaluator for ExpectationEvaluator {
    fn evaluate(&self, expectation: &Expectation, response: &ResponseSpec) -> ExpectationResult {
        match expectation {
            Expectation::StatusEquals { code } => Self::check_status(expectation, response, *code),
            Expectation::StatusClass { class, expected } => {
                Self::check_status_class(expectation, response, *class, *expected)
            }
            Expectation::HeaderMatches { name, pattern } => {
                Self::check_header_matches(expectation, response, name, pattern)
            }
            Expectation::IsJson => Self::check_is_json(expectation, response),
            Expectation::BodyIsEmpty => Self::check_body_is_empty(expectation, response),
            Expectation::BodyHasProperty {
                path,
                expected,
                mode,
            } => Self::with_json(expectation, response, |json| {
                Self::check_property(expectation, json, path, expected.as_ref(), *mode)
            }),
            Expectation::PropertyIsType { path, kind } => {
                Self::with_json(expectation, response, |json| {
                    Self::check_kind(expectation, json, path, *kind)
                })
            }
            Expectation::PropertyContains { path, needle } => {
                Self::with_json(expectation, response, |json| {
                    Self::check_contains(expectation, json, path, needle)
                })
            }
            Expectation::PropertyHasLength { path, length } => {
                Self::with_json(expectation, response, |json| {
                    Self::check_length(expectation, json, path, *length)
                })
            }
            Expectation::BodyIsArray { path } => Self::with_json(expectation, response, |json| {
                Self::check_kind(expectation, json, path, JsonKind::Array)
            }),
            Expectation::BodyIsObject { path } => Self::with_json(expectation, response, |json| {
                Self::check_kind(expectation, json, path, JsonKind::Object)
            }),
            Expectation::ArrayElementHasKeys { path, index, keys } => {
                Self::with_json(expectation, response, |json| {
                    Self::check_element_keys(expectation, json, path, *index, keys)
                })
            }
            Expectation::ObjectHasKeys { path, keys } => {
                Self::with_json(expectation, response, |json| {
                    match Self::lookup(expectation, json, path) {
                        Ok(value) => Self::check_keys(expectation, value, keys),
                        Err(result) => result,
                    }
                })
            }
        }
    }
}

fn key_list(keys: &BTreeSet<&str>) -> String {
    let joined: Vec<&str> = keys.iter().copied().collect();
    format!("[{}]", joined.join(", "))
}

/// Type and value equality. Numbers compare by value so `3` equals `3.0`.
fn strict_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| strict_eq(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| strict_eq(v, other)))
        }
        _ => actual == expected,
    }
}

/// Loose equality with numeric coercion of strings and booleans.
///
/// `null` only equals `null`; arrays and objects compare structurally.
#[allow(clippy::float_cmp)]
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            strict_eq(actual, expected)
        }
        _ => match (coerce_number(actual), coerce_number(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
        _ => None,
    }
}

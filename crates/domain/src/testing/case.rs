//! Declarative test cases.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::expectation::Expectation;
use crate::request::{HttpMethod, QueryParam, QueryParams};

/// One request plus the expectations its response must satisfy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestCase {
    /// Name shown in reports.
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the base URL; may already carry a query string.
    pub path: String,
    /// Extra query parameters appended to `path`.
    #[serde(default, skip_serializing_if = "QueryParams::is_empty")]
    pub query: QueryParams,
    /// JSON object payload, sent only for POST/PUT/PATCH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Map<String, Value>>,
    /// Per-case timeout overriding the runner default.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "optional_duration_millis"
    )]
    pub timeout: Option<Duration>,
    /// Expectations, evaluated in order.
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl TestCase {
    /// Creates a test case without body or expectations.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
            timeout: None,
            expectations: Vec::new(),
        }
    }

    /// Creates a GET test case.
    #[must_use]
    pub fn get(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Get, path)
    }

    /// Creates a POST test case.
    #[must_use]
    pub fn post(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Post, path)
    }

    /// Creates a PUT test case.
    #[must_use]
    pub fn put(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Put, path)
    }

    /// Creates a PATCH test case.
    #[must_use]
    pub fn patch(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Patch, path)
    }

    /// Creates a DELETE test case.
    #[must_use]
    pub fn delete(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(name, HttpMethod::Delete, path)
    }

    /// Appends a query parameter (builder pattern).
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.add(QueryParam::new(key, value.to_string()));
        self
    }

    /// Sets the JSON body (builder pattern).
    ///
    /// Non-object values are ignored: payloads are always JSON objects.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        if let Value::Object(map) = body {
            self.body = Some(map);
        }
        self
    }

    /// Overrides the timeout for this case (builder pattern).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds an expectation (builder pattern).
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Returns the path with `query` appended.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        self.query.append_to(&self.path)
    }

    /// Returns the payload to send, if the method carries one.
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        if self.method.has_body() {
            self.body.clone().map(Value::Object)
        } else {
            None
        }
    }
}

mod optional_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation, clippy::ref_option)]
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

//! Received response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A fully received HTTP response.
///
/// Built by the transport once the whole body has been read; expectations
/// only ever see complete responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseSpec {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase reported by the transport, empty when unknown.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status_text: String,
    /// Response headers in wire order. A repeated header keeps one entry per
    /// value. Lookups go through [`ResponseSpec::header_values`].
    pub headers: Vec<(String, String)>,
    /// Response body as text (lossy UTF-8).
    pub body: String,
    /// Time from dispatch until the body was read.
    #[serde(with = "crate::request::duration_millis")]
    pub duration: Duration,
    /// Body size in bytes.
    pub size: usize,
    /// Content-Type header value, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl ResponseSpec {
    /// Creates a response from raw transport data.
    #[must_use]
    pub fn new(
        status: u16,
        headers: Vec<(String, String)>,
        body: &[u8],
        duration: Duration,
    ) -> Self {
        let content_type = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .map(|(_, v)| v.clone());

        Self {
            status,
            status_text: String::new(),
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
            duration,
            size: body.len(),
            content_type,
        }
    }

    /// Sets the reason phrase.
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// Status code and reason phrase, e.g. `404 Not Found`.
    #[must_use]
    pub fn status_line(&self) -> String {
        if self.status_text.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.status_text)
        }
    }

    /// Every value received for a header, ignoring ASCII case in the name.
    pub fn header_values<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First value of a header, ignoring ASCII case in the name.
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// True when no body was sent (empty or whitespace only).
    #[must_use]
    pub fn is_body_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error when the body is blank or not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Duration formatted for log lines, e.g. `124 ms` or `5.21 s`.
    #[must_use]
    pub fn duration_display(&self) -> String {
        let millis = self.duration.as_millis();
        if millis < 1000 {
            format!("{millis} ms")
        } else {
            format!("{:.2} s", self.duration.as_secs_f64())
        }
    }

    /// At most `max_chars` characters of the body, with `...` when cut.
    #[must_use]
    pub fn body_preview(&self, max_chars: usize) -> String {
        match self.body.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.body[..cut]),
            None => self.body.clone(),
        }
    }
}

//! Controller results.
//!
//! A mutable accumulator handlers fill before the response is written.
//! Defaults: content type `application/json`, no headers, status `200`,
//! payload `null`.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Response under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerResult {
    content_type: String,
    headers: Vec<(String, String)>,
    status_code: u16,
    data: Value,
}

impl Default for ControllerResult {
    fn default() -> Self {
        Self {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            headers: Vec::new(),
            status_code: 200,
            data: Value::Null,
        }
    }
}

impl ControllerResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A JSON result carrying `{"error": message}`.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result
            .set_status_code(status_code)
            .set_data(serde_json::json!({ "error": message.into() }));
        result
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    /// Replace every header.
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.clear();
        for (name, value) in headers {
            self.add_header(name, value);
        }
        self
    }

    /// Insert a header, overwriting an earlier one with the same name
    /// (ASCII case-insensitive) in place.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn set_status_code(&mut self, status_code: u16) -> &mut Self {
        self.status_code = status_code;
        self
    }

    pub fn set_data(&mut self, data: Value) -> &mut Self {
        self.data = data;
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    fn body_bytes(&self) -> Vec<u8> {
        match &self.data {
            Value::String(text) if !self.content_type.contains("json") => text.clone().into_bytes(),
            other => serde_json::to_vec(other).unwrap_or_default(),
        }
    }
}

impl IntoResponse for ControllerResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body_bytes()));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(&self.content_type) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        for (name, value) in &self.headers {
            match (HeaderName::try_from(name.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping malformed response header"),
            }
        }
        response
    }
}

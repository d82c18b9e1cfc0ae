//! Raw requests as handed over by the transport layer.
//!
//! # Responsibilities
//! - Carry method, path, ordered query parameters and the parsed body
//! - Generate unique request IDs (UUID v4)
//!
//! # Design Decisions
//! - Methods are normalized to uppercase on construction
//! - Query parameters keep their arrival order, duplicates included
//! - Request ID added as early as possible for tracing

use axum::http::{HeaderName, HeaderValue, Request};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A request as seen by the dispatch core.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    method: String,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl RawRequest {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_ascii_uppercase(),
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a single query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append every parameter of a URL-encoded query string.
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query.extend(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
        );
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Generates a fresh UUID v4 for every request lacking an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

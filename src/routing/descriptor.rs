//! Resolved route descriptors.

use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::Value;

use crate::http::request::RawRequest;

/// Which resolution rule produced a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// A `_<namespace>-<controller>/<action>` path naming a known controller.
    Controller,
    /// A leading directive naming a built-in handler or application.
    Handler,
    /// Plain `/<database>/<document>` data route on the generic handler.
    Data,
}

/// Immutable description of how a request shape is dispatched.
///
/// Identifiers are `None` when the path position is absent or holds a
/// directive. Equality compares every routing field and the body, never the
/// request back-reference.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub(crate) kind: RouteKind,
    pub(crate) method: String,
    pub(crate) database_identifier: Option<String>,
    pub(crate) data_identifier: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) controller_class: Option<String>,
    pub(crate) handler_class: Option<String>,
    pub(crate) request: Weak<RawRequest>,
    pub(crate) body: Option<Value>,
}

impl RouteDescriptor {
    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    /// Uppercase HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn database_identifier(&self) -> Option<&str> {
        self.database_identifier.as_deref()
    }

    pub fn data_identifier(&self) -> Option<&str> {
        self.data_identifier.as_deref()
    }

    /// Synthesized action method name, `None` if unresolved.
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    /// Controller type name, set only for [`RouteKind::Controller`].
    pub fn controller_class(&self) -> Option<&str> {
        self.controller_class.as_deref()
    }

    /// Handler type serving a non-controller route.
    pub fn handler_class(&self) -> Option<&str> {
        self.handler_class.as_deref()
    }

    /// The request this shape was first resolved from, if still alive.
    pub fn request(&self) -> Option<Arc<RawRequest>> {
        self.request.upgrade()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// A new descriptor with the same routing decision and `body`.
    pub fn with_body(&self, body: Option<Value>) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }
}

impl PartialEq for RouteDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.method == other.method
            && self.database_identifier == other.database_identifier
            && self.data_identifier == other.data_identifier
            && self.action == other.action
            && self.controller_class == other.controller_class
            && self.handler_class == other.handler_class
            && self.body == other.body
    }
}

impl Eq for RouteDescriptor {}

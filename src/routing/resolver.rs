//! Route resolution.
//!
//! # Responsibilities
//! - Decide which rule serves a request (controller, handler, data)
//! - Extract the positional database and document identifiers
//! - Synthesize the action method name
//!
//! # Rule Precedence
//! ```text
//! 1. Controller: first segment `_<ns>-<controller>`, at least two segments,
//!    controller type known → identifiers from segments 2 and 3
//! 2. Handler: first segment is any other directive → application or
//!    `<Directive>Handler` type, action scanned from directive segments
//! 3. Data: identifiers from segments 0 and 1, action scanned on the generic
//!    handler contract
//! ```
//!
//! # Design Decisions
//! - Type existence is a catalog lookup, never introspection
//! - A missing type is a negative result that falls through to the next rule
//! - An invalid controller action name is a hard error

use std::sync::Arc;

use crate::http::request::RawRequest;
use crate::routing::catalog::TypeCatalog;
use crate::routing::descriptor::{RouteDescriptor, RouteKind};
use crate::routing::naming::{self, DEFAULT_HANDLER};
use crate::routing::segment::{segment_path, Segment};
use crate::routing::RoutingError;

/// Resolves raw requests into [`RouteDescriptor`]s against a type catalog.
#[derive(Debug, Clone)]
pub struct RouteResolver {
    catalog: Arc<dyn TypeCatalog>,
}

struct ControllerRoute {
    class: String,
    action: String,
}

impl RouteResolver {
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `request` into a descriptor holding a weak back-reference to it.
    pub fn resolve(&self, request: &Arc<RawRequest>) -> Result<RouteDescriptor, RoutingError> {
        let method = request.method();
        let segments = segment_path(request.path());

        if let Some(controller) = self.controller_route(method, &segments)? {
            tracing::trace!(
                path = %request.path(),
                controller = %controller.class,
                action = %controller.action,
                "Resolved controller route"
            );
            return Ok(RouteDescriptor {
                kind: RouteKind::Controller,
                method: method.to_string(),
                database_identifier: identifier_at(&segments, 2),
                data_identifier: identifier_at(&segments, 3),
                action: Some(controller.action),
                controller_class: Some(controller.class),
                handler_class: None,
                request: Arc::downgrade(request),
                body: None,
            });
        }

        let handler_class = self.handler_class(&segments);
        let action = self.scan_action(method, &segments, &handler_class);
        let kind = if handler_class == DEFAULT_HANDLER {
            RouteKind::Data
        } else {
            RouteKind::Handler
        };

        tracing::trace!(
            path = %request.path(),
            kind = ?kind,
            handler = %handler_class,
            action = ?action,
            "Resolved route"
        );

        Ok(RouteDescriptor {
            kind,
            method: method.to_string(),
            database_identifier: identifier_at(&segments, 0),
            data_identifier: identifier_at(&segments, 1),
            action,
            controller_class: None,
            handler_class: Some(handler_class),
            request: Arc::downgrade(request),
            body: None,
        })
    }

    /// Rule 1. `Ok(None)` when the path does not name a known controller.
    fn controller_route(
        &self,
        method: &str,
        segments: &[Segment<'_>],
    ) -> Result<Option<ControllerRoute>, RoutingError> {
        let (Some(directive), Some(action_segment)) = (
            segments.first().and_then(Segment::directive_name),
            segments.get(1),
        ) else {
            return Ok(None);
        };

        let Some(class) = naming::controller_class_name(directive) else {
            return Ok(None);
        };
        if !self.catalog.type_exists(&class) {
            return Ok(None);
        }

        // The controller may not implement the action; that is for the
        // dispatch loop to report.
        let action = naming::action_name(method, &action_segment.raw())?;
        Ok(Some(ControllerRoute { class, action }))
    }

    /// Rule 2 type lookup, falling back to the generic handler contract.
    fn handler_class(&self, segments: &[Segment<'_>]) -> String {
        let Some(directive) = segments.first().and_then(Segment::directive_name) else {
            return DEFAULT_HANDLER.to_string();
        };

        let application = naming::application_class_name(directive);
        if self.catalog.type_exists(&application) {
            return application;
        }

        let handler = naming::handler_class_name(directive);
        if self.catalog.type_exists(&handler) {
            return handler;
        }

        DEFAULT_HANDLER.to_string()
    }

    /// Leftmost directive segment whose action exists on `handler_class`.
    fn scan_action(&self, method: &str, segments: &[Segment<'_>], handler_class: &str) -> Option<String> {
        segments
            .iter()
            .filter_map(Segment::directive_name)
            // Malformed names can never be catalogued actions.
            .filter_map(|name| naming::action_name(method, name).ok())
            .find(|action| self.catalog.has_action(handler_class, action))
    }
}

fn identifier_at(segments: &[Segment<'_>], index: usize) -> Option<String> {
    segments
        .get(index)
        .map(Segment::as_identifier)
        .filter(|id| !id.is_empty())
}

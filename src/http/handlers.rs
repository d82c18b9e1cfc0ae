//! Built-in request handlers and the handler set.
//!
//! # Responsibilities
//! - Map handler and controller type names to implementations
//! - Derive the routing catalog from the registered implementations
//! - Serve data routes from the object registry
//!
//! # Data Model
//! ```text
//! document  → identifier "<database>/<document>", tag "db:<database>"
//! database  → the set of identifiers under its tag
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::cache::ResolutionCache;
use crate::http::result::ControllerResult;
use crate::memory::{RegistryError, TaggedObjectRegistry};
use crate::routing::naming::{handler_class_name, DEFAULT_HANDLER};
use crate::routing::{RouteDescriptor, StaticCatalog};

const DATABASE_TAG_PREFIX: &str = "db:";

/// Shared state visible to handlers.
pub struct HandlerContext<'a> {
    pub registry: &'a TaggedObjectRegistry,
    pub cache: &'a ResolutionCache,
}

/// A handler or controller type.
pub trait RequestHandler: Send + Sync {
    /// Action methods this type exposes.
    fn actions(&self) -> &[&str];

    /// Serve a resolved route.
    fn handle(&self, route: &RouteDescriptor, ctx: &HandlerContext<'_>) -> ControllerResult;
}

/// Handler implementations keyed by type name.
#[derive(Default, Clone)]
pub struct HandlerSet {
    handlers: HashMap<String, Arc<dyn RequestHandler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in data and stats handlers.
    pub fn builtin() -> Self {
        Self::new()
            .with(DEFAULT_HANDLER, DataHandler)
            .with(handler_class_name("stats"), StatsHandler)
    }

    /// Register `handler` under `type_name`, replacing any previous one.
    pub fn with(mut self, type_name: impl Into<String>, handler: impl RequestHandler + 'static) -> Self {
        self.handlers.insert(type_name.into(), Arc::new(handler));
        self
    }

    /// Catalog describing every registered type and its actions.
    pub fn catalog(&self) -> StaticCatalog {
        self.handlers
            .iter()
            .fold(StaticCatalog::new(), |catalog, (name, handler)| {
                catalog.with_type(name.clone(), handler.actions().iter().copied())
            })
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn RequestHandler>> {
        self.handlers.get(type_name)
    }

    /// Serve `route` with the controller or handler it names.
    pub fn handle(&self, route: &RouteDescriptor, ctx: &HandlerContext<'_>) -> ControllerResult {
        let type_name = route
            .controller_class()
            .or_else(|| route.handler_class())
            .unwrap_or(DEFAULT_HANDLER);

        match self.get(type_name) {
            Some(handler) => handler.handle(route, ctx),
            None => {
                tracing::error!(handler = %type_name, "Route names an unregistered handler");
                ControllerResult::error(500, format!("no implementation for {type_name}"))
            }
        }
    }
}

impl std::fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

fn database_tag(database: &str) -> String {
    format!("{DATABASE_TAG_PREFIX}{database}")
}

fn document_identifier(database: &str, document: &str) -> String {
    format!("{database}/{document}")
}

fn json_result(status: u16, data: Value) -> ControllerResult {
    let mut result = ControllerResult::new();
    result.set_status_code(status).set_data(data);
    result
}

fn registry_error(error: RegistryError) -> ControllerResult {
    ControllerResult::error(404, error.to_string())
}

/// Generic data handler: documents stored as registry objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataHandler;

impl DataHandler {
    fn all_dbs(ctx: &HandlerContext<'_>) -> ControllerResult {
        let databases: Vec<String> = ctx
            .registry
            .tags()
            .into_iter()
            .filter_map(|tag| tag.strip_prefix(DATABASE_TAG_PREFIX).map(str::to_string))
            .collect();
        json_result(200, json!(databases))
    }

    fn count(database: &str, ctx: &HandlerContext<'_>) -> ControllerResult {
        let count = ctx
            .registry
            .identifiers_by_tag(&database_tag(database), true)
            .map(|ids| ids.len())
            .unwrap_or_default();
        json_result(200, json!({ "database": database, "count": count }))
    }

    fn list(database: &str, ctx: &HandlerContext<'_>) -> ControllerResult {
        match ctx.registry.identifiers_by_tag(&database_tag(database), false) {
            Ok(_) => {
                let documents: Vec<Value> = ctx
                    .registry
                    .objects_by_tag_as::<Value>(&database_tag(database))
                    .into_iter()
                    .map(|(_, doc)| doc.as_ref().clone())
                    .collect();
                json_result(200, json!(documents))
            }
            Err(e) => registry_error(e),
        }
    }

    fn store(database: &str, document: &str, route: &RouteDescriptor, ctx: &HandlerContext<'_>, status: u16) -> ControllerResult {
        let Some(body) = route.body() else {
            return ControllerResult::error(400, "request body required");
        };
        let mut stored = body.clone();
        if let Value::Object(fields) = &mut stored {
            fields.insert("_id".to_string(), json!(document));
        }
        ctx.registry.register(
            document_identifier(database, document),
            stored.clone(),
            [database_tag(database)],
        );
        json_result(status, stored)
    }

    fn data_route(route: &RouteDescriptor, ctx: &HandlerContext<'_>) -> ControllerResult {
        let (database, document) = (route.database_identifier(), route.data_identifier());
        match (route.method(), database, document) {
            ("GET", None, _) => json_result(
                200,
                json!({ "server": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }),
            ),
            ("GET", Some(db), None) => Self::list(db, ctx),
            ("GET", Some(db), Some(doc)) => match ctx.registry.get_as::<Value>(&document_identifier(db, doc)) {
                Some(value) => json_result(200, value.as_ref().clone()),
                None => ControllerResult::error(404, format!("document {doc:?} not found in {db:?}")),
            },
            ("PUT", Some(db), Some(doc)) => Self::store(db, doc, route, ctx, 200),
            ("POST", Some(db), Some(doc)) => Self::store(db, doc, route, ctx, 201),
            ("POST", Some(db), None) => {
                let id = route
                    .body()
                    .and_then(|b| b.get("_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                Self::store(db, &id, route, ctx, 201)
            }
            ("DELETE", Some(db), Some(doc)) => match ctx.registry.free(&document_identifier(db, doc)) {
                Ok(_) => json_result(200, json!({ "deleted": doc })),
                Err(e) => registry_error(e),
            },
            ("DELETE", Some(db), None) => {
                let freed = ctx.registry.free_objects_by_tag(&database_tag(db));
                json_result(200, json!({ "database": db, "deleted": freed.len() }))
            }
            (method, _, _) => ControllerResult::error(405, format!("method {method} not supported here")),
        }
    }
}

impl RequestHandler for DataHandler {
    fn actions(&self) -> &[&str] {
        &["getAllDbsAction", "getCountAction"]
    }

    fn handle(&self, route: &RouteDescriptor, ctx: &HandlerContext<'_>) -> ControllerResult {
        match (route.action(), route.database_identifier()) {
            (Some("getAllDbsAction"), _) => Self::all_dbs(ctx),
            (Some("getCountAction"), Some(db)) => Self::count(db, ctx),
            (Some("getCountAction"), None) => json_result(200, json!({ "count": ctx.registry.len() })),
            _ => Self::data_route(route, ctx),
        }
    }
}

/// Reports resolution cache and registry statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsHandler;

impl StatsHandler {
    fn registry(ctx: &HandlerContext<'_>) -> Value {
        json!({ "objects": ctx.registry.len(), "tags": ctx.registry.tag_count() })
    }
}

impl RequestHandler for StatsHandler {
    fn actions(&self) -> &[&str] {
        &["getCacheAction", "getRegistryAction"]
    }

    fn handle(&self, route: &RouteDescriptor, ctx: &HandlerContext<'_>) -> ControllerResult {
        let cache = json!(ctx.cache.stats());
        match route.action() {
            Some("getCacheAction") => json_result(200, cache),
            Some("getRegistryAction") => json_result(200, Self::registry(ctx)),
            _ => json_result(200, json!({ "cache": cache, "registry": Self::registry(ctx) })),
        }
    }
}

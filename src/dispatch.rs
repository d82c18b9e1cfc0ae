//! Request dispatch entry point.
//!
//! ```text
//! RawRequest
//!     → routing::admin (POST /_shutdown, /_restart)
//!         ↳ emitted as an event, no route resolution
//!     → cache::ResolutionCache (fingerprint lookup, resolve on miss)
//!     → Dispatch::Route(descriptor)
//! ```

use std::sync::Arc;

use serde_json::json;

use crate::cache::ResolutionCache;
use crate::events::EventEmitter;
use crate::http::request::RawRequest;
use crate::observability::metrics;
use crate::routing::{admin_action, AdminAction, RouteDescriptor, RoutingError};

/// Outcome of dispatching a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A process-control action; it has been forwarded to the event sink.
    Administrative(AdminAction),
    /// A resolved route for the handler layer.
    Route(Arc<RouteDescriptor>),
}

/// Combines admin detection, the resolution cache and the event sink.
#[derive(Debug)]
pub struct Dispatcher {
    cache: ResolutionCache,
    events: Arc<EventEmitter>,
}

impl Dispatcher {
    pub fn new(cache: ResolutionCache, events: Arc<EventEmitter>) -> Self {
        Self { cache, events }
    }

    pub fn dispatch(&self, request: &Arc<RawRequest>) -> Result<Dispatch, RoutingError> {
        if let Some(action) = admin_action(request.method(), request.path()) {
            tracing::info!(action = %action, "Administrative action requested");
            metrics::record_admin_action(action.as_str());
            self.events
                .schedule_future_emit(action.event_name(), vec![json!(action.as_str())]);
            return Ok(Dispatch::Administrative(action));
        }

        self.cache.resolve(request).map(Dispatch::Route)
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::naming::DEFAULT_HANDLER;
    use crate::routing::{RouteKind, RouteResolver, StaticCatalog};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dispatcher() -> Dispatcher {
        let catalog = StaticCatalog::new().with_type(DEFAULT_HANDLER, ["getCountAction"]);
        let cache = ResolutionCache::new(RouteResolver::new(Arc::new(catalog)), 8);
        Dispatcher::new(cache, Arc::new(EventEmitter::new()))
    }

    #[test]
    fn test_shutdown_is_signaled_not_routed() {
        let dispatcher = dispatcher();
        let signaled = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&signaled);
        dispatcher.events().on("server.shutdown", move |event| {
            assert_eq!(event.arguments, vec![json!("shutdown")]);
            s.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = dispatcher
            .dispatch(&Arc::new(RawRequest::new("POST", "/_shutdown")))
            .unwrap();
        assert_eq!(outcome, Dispatch::Administrative(AdminAction::Shutdown));
        assert_eq!(signaled.load(Ordering::SeqCst), 1);
        assert!(dispatcher.cache().is_empty());
    }

    #[test]
    fn test_get_shutdown_is_routed() {
        let outcome = dispatcher()
            .dispatch(&Arc::new(RawRequest::new("GET", "/_shutdown")))
            .unwrap();
        let Dispatch::Route(route) = outcome else {
            panic!("expected a route");
        };
        assert_eq!(route.kind(), RouteKind::Data);
    }
}

//! Startup orchestration.
//!
//! Builds the process-wide state in dependency order: handler catalog,
//! resolver and cache, event emitter, registry, dispatcher. Admin events are
//! wired to the shutdown coordinator here.

use std::sync::Arc;

use crate::cache::ResolutionCache;
use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::events::EventEmitter;
use crate::http::{AppState, HandlerSet};
use crate::lifecycle::shutdown::{Shutdown, ShutdownReason};
use crate::memory::TaggedObjectRegistry;
use crate::routing::{AdminAction, RouteResolver};

/// Assemble the application state for `config` and `handlers`.
///
/// Scheduled events are delivered synchronously until an execution context
/// is attached to the returned dispatcher's emitter. Installing the registry
/// process-wide is left to the caller.
pub fn bootstrap(config: &ServerConfig, handlers: HandlerSet) -> AppState {
    let catalog = handlers.catalog();
    tracing::info!(types = catalog.len(), "Handler catalog built");

    let resolver = RouteResolver::new(Arc::new(catalog));
    let cache = ResolutionCache::new(resolver, config.cache.capacity);

    let shutdown = Shutdown::new();
    let events = Arc::new(EventEmitter::new());
    wire_admin_actions(&events, &shutdown);

    let registry = Arc::new(TaggedObjectRegistry::new());

    AppState {
        dispatcher: Arc::new(Dispatcher::new(cache, events)),
        handlers: Arc::new(handlers),
        registry,
        shutdown,
    }
}

fn wire_admin_actions(events: &EventEmitter, shutdown: &Shutdown) {
    for (action, reason) in [
        (AdminAction::Shutdown, ShutdownReason::Shutdown),
        (AdminAction::Restart, ShutdownReason::Restart),
    ] {
        let shutdown = shutdown.clone();
        events.on(action.event_name(), move |_| shutdown.trigger(reason));
    }
}

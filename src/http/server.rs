//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Convert Axum requests into raw requests and controller results into
//!   responses
//! - Forward administrative actions and stop on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::ResolutionCache;
use crate::config::ServerConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::http::handlers::{HandlerContext, HandlerSet};
use crate::http::request::{RawRequest, UuidRequestId, X_REQUEST_ID};
use crate::http::result::ControllerResult;
use crate::lifecycle::{Shutdown, ShutdownReason};
use crate::memory::TaggedObjectRegistry;
use crate::routing::RoutingError;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub handlers: Arc<HandlerSet>,
    pub registry: Arc<TaggedObjectRegistry>,
    pub shutdown: Shutdown,
}

/// HTTP front end of the document store.
///
/// Request limits and timeouts come from the [`ServerConfig`] passed to
/// [`HttpServer::new`]; everything else lives in the [`AppState`].
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: AppState) -> Self {
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.limits.max_body_bytes))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The router, for serving without a listener (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown is triggered and report why it
    /// stopped.
    pub async fn run(self, listener: TcpListener) -> Result<ShutdownReason, std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let mut stop = self.state.shutdown.subscribe();
        let (reason_tx, reason_rx) = oneshot::channel();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = loop {
                    match stop.recv().await {
                        Ok(reason) => break reason,
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break ShutdownReason::Signal,
                    }
                };
                tracing::info!(reason = ?reason, "HTTP server draining");
                let _ = reason_tx.send(reason);
            })
            .await?;

        let reason = reason_rx.await.unwrap_or(ShutdownReason::Signal);
        let freed = self.state.registry.len();
        self.state.registry.free_all();
        tracing::info!(freed_objects = freed, reason = ?reason, "HTTP server stopped");
        Ok(reason)
    }
}

/// Turns a request into a dispatch and the dispatch into a response.
async fn dispatch_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let mut raw = RawRequest::new(method.as_str(), uri.path());
    if let Some(query) = uri.query() {
        raw = raw.with_query_string(query);
    }

    // 413 for the length limit, 400 for any other read failure.
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(status = %rejection.status(), error = %rejection.body_text(), "Request body rejected");
            return ControllerResult::error(rejection.status().as_u16(), rejection.body_text()).into_response();
        }
    };
    let payload: Option<Value> = if bytes.is_empty() {
        None
    } else {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                return ControllerResult::error(400, format!("invalid JSON body: {e}")).into_response();
            }
        }
    };
    if let Some(value) = &payload {
        raw = raw.with_body(value.clone());
    }
    let raw = Arc::new(raw);

    match state.dispatcher.dispatch(&raw) {
        Ok(Dispatch::Administrative(action)) => {
            let mut result = ControllerResult::new();
            result
                .set_status_code(202)
                .set_data(json!({ "message": format!("Server is going to {action}") }));
            result.into_response()
        }
        Ok(Dispatch::Route(descriptor)) => {
            let route = ResolutionCache::copy_with_body(&descriptor, payload);
            let ctx = HandlerContext {
                registry: &state.registry,
                cache: state.dispatcher.cache(),
            };
            state.handlers.handle(&route, &ctx).into_response()
        }
        Err(e @ RoutingError::InvalidActionName { .. }) => {
            tracing::warn!(path = %raw.path(), error = %e, "Malformed request path");
            ControllerResult::error(400, e.to_string()).into_response()
        }
    }
}

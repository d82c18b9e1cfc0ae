//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use docstore_dispatch::config::ServerConfig;
use docstore_dispatch::http::{
    AppState, ControllerResult, HandlerContext, HandlerSet, HttpServer, RequestHandler,
};
use docstore_dispatch::lifecycle::{startup, ShutdownReason};
use docstore_dispatch::routing::RouteDescriptor;

/// Controller used to exercise directive routing.
pub struct BarController;

impl RequestHandler for BarController {
    fn actions(&self) -> &[&str] {
        &["postCreateAction"]
    }

    fn handle(&self, route: &RouteDescriptor, _ctx: &HandlerContext<'_>) -> ControllerResult {
        let mut result = ControllerResult::new();
        result
            .set_status_code(201)
            .add_header("X-Controller", "bar")
            .set_data(json!({
                "action": route.action(),
                "body": route.body(),
            }));
        result
    }
}

/// Built-in handlers plus [`BarController`].
#[allow(dead_code)]
pub fn handlers() -> HandlerSet {
    HandlerSet::builtin().with("Foo\\Controller\\BarController", BarController)
}

/// Application state for the default configuration.
#[allow(dead_code)]
pub fn state() -> AppState {
    startup::bootstrap(&ServerConfig::default(), handlers())
}

/// Build an HTTP request with an optional JSON body.
#[allow(dead_code)]
pub fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    Request::builder().method(method).uri(uri).body(body).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Start a server on an ephemeral port and return its address and the task
/// that yields the shutdown reason.
#[allow(dead_code)]
pub async fn start_server(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<ShutdownReason>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&ServerConfig::default(), state);

    let handle = tokio::spawn(async move { server.run(listener).await.unwrap() });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, handle)
}

/// Send a raw HTTP/1.1 request and return the full response text.
#[allow(dead_code)]
pub async fn send_raw(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

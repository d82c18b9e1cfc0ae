//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (RawRequest: method, path, query, body)
//!     → [dispatch: admin action or resolved route]
//!     → handlers.rs (handler / controller by type name)
//!     → result.rs (ControllerResult → response)
//! ```

pub mod handlers;
pub mod request;
pub mod result;
pub mod server;

pub use handlers::{HandlerContext, HandlerSet, RequestHandler};
pub use request::{RawRequest, X_REQUEST_ID};
pub use result::ControllerResult;
pub use server::{AppState, HttpServer};

//! Request dispatch and object lifecycle core of a small document-store
//! server.
//!
//! - [`routing`] turns a request path into a [`routing::RouteDescriptor`]
//! - [`cache`] memoizes that resolution per request fingerprint
//! - [`memory`] tracks live objects by identifier and tag
//! - [`dispatch`] ties both to the [`events`] sink for admin actions

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod memory;
pub mod observability;
pub mod routing;

pub use cache::ResolutionCache;
pub use config::ServerConfig;
pub use dispatch::{Dispatch, Dispatcher};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use memory::TaggedObjectRegistry;

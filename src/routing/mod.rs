//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Raw request (method, path)
//!     → admin.rs (process-control short circuit)
//!     → segment.rs (split + classify segments)
//!     → resolver.rs (controller → handler → data rules)
//!         ↳ naming.rs (action and type names)
//!         ↳ catalog.rs (type / action existence)
//!     → RouteDescriptor
//! ```
//!
//! # Design Decisions
//! - Catalog assembled at startup, immutable at runtime
//! - Deterministic: same method and path always resolve the same way
//! - Naming conventions isolated from control flow

pub mod admin;
pub mod catalog;
pub mod descriptor;
pub mod naming;
pub mod resolver;
pub mod segment;

pub use admin::{admin_action, AdminAction};
pub use catalog::{StaticCatalog, TypeCatalog};
pub use descriptor::{RouteDescriptor, RouteKind};
pub use resolver::RouteResolver;

/// Errors raised while resolving a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// A synthesized action name contains non-alphanumeric characters.
    #[error("action name must be alphanumeric: {action:?}")]
    InvalidActionName { action: String },
}

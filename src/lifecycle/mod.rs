//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build catalog, registry, emitter → Dispatcher → Listen
//!
//! Shutdown (shutdown.rs):
//!     Signal or admin action → Stop accepting → Free registry → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core state, then listeners
//! - Admin actions reach the coordinator through the event emitter

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownReason};

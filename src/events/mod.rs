//! Event notification.
//!
//! Administrative actions and lifecycle events are forwarded to an
//! [`EventEmitter`]; listeners are registered at startup.

pub mod emitter;

pub use emitter::{Event, EventEmitter, Listener, ListenerId};

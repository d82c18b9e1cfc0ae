//! Request resolution caching.
//!
//! ```text
//! RawRequest → fingerprint.rs (SHA-256 of method, path, sorted query)
//!            → resolution.rs (LRU lookup, resolve on miss)
//!            → Arc<RouteDescriptor>
//! ```

pub mod fingerprint;
pub mod resolution;

pub use fingerprint::Fingerprint;
pub use resolution::{CacheStats, ResolutionCache};

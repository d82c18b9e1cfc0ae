//! Live object management.
//!
//! # Data Flow
//! ```text
//! startup: TaggedObjectRegistry::new() → global::install()
//! handlers: register / get / free by identifier
//!           identifiers_by_tag / objects_by_tag / free_objects_by_tag by tag
//! shutdown: free_all()
//! ```

pub mod global;
pub mod registry;

pub use registry::{ManagedObject, TaggedObjectRegistry};

/// Errors raised by the object registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// `free` was called for an identifier that holds no object.
    #[error("no object registered for identifier {identifier:?}")]
    NotRegistered { identifier: String },

    /// A strict tag query named a tag without members.
    #[error("tag {tag:?} not found")]
    UnknownTag { tag: String },
}

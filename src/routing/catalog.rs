//! Static catalog of known handler and controller types.
//!
//! # Responsibilities
//! - Answer "does type N exist"
//! - Answer "does type T expose action M"
//!
//! # Design Decisions
//! - Built once at process start, immutable afterwards (no locking)
//! - Queried through the [`TypeCatalog`] trait so the resolver does not care
//!   how the catalog was assembled

use std::collections::{HashMap, HashSet};

/// Read-only view over the set of dispatchable types.
pub trait TypeCatalog: Send + Sync + std::fmt::Debug {
    /// Returns true if a type with this fully-qualified name is known.
    fn type_exists(&self, type_name: &str) -> bool;

    /// Returns true if `type_name` is known and exposes `action`.
    fn has_action(&self, type_name: &str, action: &str) -> bool;
}

/// A [`TypeCatalog`] assembled from explicit registrations.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: HashMap<String, HashSet<String>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type with the actions it exposes. Registering the same
    /// type twice merges the action sets.
    pub fn with_type<I, S>(mut self, type_name: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .entry(type_name.into())
            .or_default()
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TypeCatalog for StaticCatalog {
    fn type_exists(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    fn has_action(&self, type_name: &str, action: &str) -> bool {
        self.types
            .get(type_name)
            .map(|actions| actions.contains(action))
            .unwrap_or(false)
    }
}

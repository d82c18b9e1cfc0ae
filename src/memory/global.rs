//! Process-wide registry handle.
//!
//! The server installs its registry once at startup; any component can then
//! reach it through [`global`] without holding a reference. Components that
//! are handed a registry explicitly should prefer that one.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::memory::registry::TaggedObjectRegistry;

static GLOBAL_REGISTRY: ArcSwapOption<TaggedObjectRegistry> = ArcSwapOption::const_empty();

/// Install `registry` as the process-wide registry, returning the previous one.
pub fn install(registry: Arc<TaggedObjectRegistry>) -> Option<Arc<TaggedObjectRegistry>> {
    tracing::debug!("Installing process-wide object registry");
    GLOBAL_REGISTRY.swap(Some(registry))
}

/// Remove the process-wide registry.
pub fn uninstall() -> Option<Arc<TaggedObjectRegistry>> {
    GLOBAL_REGISTRY.swap(None)
}

/// The installed registry, if any.
pub fn installed() -> Option<Arc<TaggedObjectRegistry>> {
    GLOBAL_REGISTRY.load_full()
}

/// The installed registry, installing an empty one on first use.
pub fn global() -> Arc<TaggedObjectRegistry> {
    if let Some(registry) = GLOBAL_REGISTRY.load_full() {
        return registry;
    }
    let fresh = Arc::new(TaggedObjectRegistry::new());
    let previous = GLOBAL_REGISTRY.compare_and_swap(&None::<Arc<TaggedObjectRegistry>>, Some(Arc::clone(&fresh)));
    match &*previous {
        Some(existing) => Arc::clone(existing),
        None => fresh,
    }
}

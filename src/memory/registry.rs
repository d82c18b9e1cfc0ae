//! Tagged object registry.
//!
//! # Responsibilities
//! - Map identifiers to live objects
//! - Maintain a tag → identifiers secondary index
//! - Bulk lookup and eviction by tag, full teardown
//!
//! # Design Decisions
//! - One `RwLock` guards the primary map and the tag index together, so a
//!   reader never sees them disagree and tag eviction is all-or-nothing
//! - Tag buckets are pruned as soon as they empty; a strict query on such a
//!   tag fails with [`RegistryError::UnknownTag`]
//! - Objects are type-erased `Arc`s; typed access goes through downcasting

use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::memory::RegistryError;
use crate::observability::metrics;

/// A registered object.
pub type ManagedObject = Arc<dyn Any + Send + Sync>;

struct Entry {
    object: ManagedObject,
    tags: BTreeSet<String>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Entry>,
    tags: HashMap<String, BTreeSet<String>>,
}

impl Inner {
    /// Remove `identifier` and all of its tag memberships.
    fn remove(&mut self, identifier: &str) -> Option<Entry> {
        let entry = self.objects.remove(identifier)?;
        for tag in &entry.tags {
            if let Some(bucket) = self.tags.get_mut(tag) {
                bucket.remove(identifier);
                if bucket.is_empty() {
                    self.tags.remove(tag);
                }
            }
        }
        Some(entry)
    }
}

/// Concurrent store of live objects addressable by identifier and tag.
#[derive(Default)]
pub struct TaggedObjectRegistry {
    inner: RwLock<Inner>,
}

impl TaggedObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `identifier`, replacing any previous entry and
    /// its tag memberships.
    pub fn register<T, I, S>(&self, identifier: impl Into<String>, object: T, tags: I)
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register_shared(identifier, Arc::new(object), tags)
    }

    /// Like [`register`](Self::register) for an object that is already shared.
    pub fn register_shared<I, S>(&self, identifier: impl Into<String>, object: ManagedObject, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let identifier = identifier.into();
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();

        let mut inner = self.inner.write();
        inner.remove(&identifier);
        for tag in &tags {
            inner
                .tags
                .entry(tag.clone())
                .or_default()
                .insert(identifier.clone());
        }
        tracing::trace!(identifier = %identifier, tags = ?tags, "Registered object");
        inner.objects.insert(identifier, Entry { object, tags });
        metrics::record_registry_size(inner.objects.len());
    }

    /// The object registered under `identifier`.
    pub fn get(&self, identifier: &str) -> Option<ManagedObject> {
        self.inner
            .read()
            .objects
            .get(identifier)
            .map(|entry| Arc::clone(&entry.object))
    }

    /// The object registered under `identifier` if it is a `T`.
    pub fn get_as<T: Any + Send + Sync>(&self, identifier: &str) -> Option<Arc<T>> {
        self.get(identifier)
            .and_then(|object| object.downcast::<T>().ok())
    }

    pub fn has(&self, identifier: &str) -> bool {
        self.inner.read().objects.contains_key(identifier)
    }

    /// Tags currently attached to `identifier`.
    pub fn tags_of(&self, identifier: &str) -> Option<BTreeSet<String>> {
        self.inner
            .read()
            .objects
            .get(identifier)
            .map(|entry| entry.tags.clone())
    }

    /// Remove `identifier` and its tag memberships, returning the object.
    pub fn free(&self, identifier: &str) -> Result<ManagedObject, RegistryError> {
        let mut inner = self.inner.write();
        match inner.remove(identifier) {
            Some(entry) => {
                metrics::record_registry_size(inner.objects.len());
                Ok(entry.object)
            }
            None => {
                tracing::warn!(identifier = %identifier, "Attempt to free unregistered object");
                Err(RegistryError::NotRegistered {
                    identifier: identifier.to_string(),
                })
            }
        }
    }

    /// Identifiers carrying `tag`. An unknown tag yields an empty set when
    /// `graceful`, otherwise [`RegistryError::UnknownTag`].
    pub fn identifiers_by_tag(&self, tag: &str, graceful: bool) -> Result<BTreeSet<String>, RegistryError> {
        match self.inner.read().tags.get(tag) {
            Some(bucket) => Ok(bucket.clone()),
            None if graceful => Ok(BTreeSet::new()),
            None => Err(RegistryError::UnknownTag { tag: tag.to_string() }),
        }
    }

    /// Objects carrying `tag`, ordered by identifier. Unknown tags yield
    /// nothing.
    pub fn objects_by_tag(&self, tag: &str) -> Vec<(String, ManagedObject)> {
        let inner = self.inner.read();
        let Some(bucket) = inner.tags.get(tag) else {
            return Vec::new();
        };
        bucket
            .iter()
            .filter_map(|id| {
                inner
                    .objects
                    .get(id)
                    .map(|entry| (id.clone(), Arc::clone(&entry.object)))
            })
            .collect()
    }

    /// Typed variant of [`objects_by_tag`](Self::objects_by_tag) that skips
    /// objects of other types.
    pub fn objects_by_tag_as<T: Any + Send + Sync>(&self, tag: &str) -> Vec<(String, Arc<T>)> {
        self.objects_by_tag(tag)
            .into_iter()
            .filter_map(|(id, object)| object.downcast::<T>().ok().map(|typed| (id, typed)))
            .collect()
    }

    /// Free every object carrying `tag`, including its memberships in other
    /// tags. Returns the freed identifiers.
    pub fn free_objects_by_tag(&self, tag: &str) -> BTreeSet<String> {
        let mut inner = self.inner.write();
        let Some(identifiers) = inner.tags.get(tag).cloned() else {
            return BTreeSet::new();
        };
        for identifier in &identifiers {
            inner.remove(identifier);
        }
        metrics::record_registry_size(inner.objects.len());
        tracing::debug!(tag = %tag, freed = identifiers.len(), "Freed objects by tag");
        identifiers
    }

    /// Free every object and tag.
    pub fn free_all(&self) {
        let mut inner = self.inner.write();
        let freed = inner.objects.len();
        inner.objects.clear();
        inner.tags.clear();
        metrics::record_registry_size(0);
        tracing::debug!(freed, "Freed all objects");
    }

    /// Release memory held by internal bookkeeping. No identifier or tag
    /// changes.
    pub fn cleanup(&self) {
        let mut inner = self.inner.write();
        inner.objects.shrink_to_fit();
        inner.tags.shrink_to_fit();
    }

    pub fn len(&self) -> usize {
        self.inner.read().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tags with at least one member.
    pub fn tag_count(&self) -> usize {
        self.inner.read().tags.len()
    }

    /// All known tags.
    pub fn tags(&self) -> BTreeSet<String> {
        self.inner.read().tags.keys().cloned().collect()
    }
}

impl std::fmt::Debug for TaggedObjectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("TaggedObjectRegistry")
            .field("objects", &inner.objects.len())
            .field("tags", &inner.tags.len())
            .finish()
    }
}

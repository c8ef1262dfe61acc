/// Annotation metadata registry.
///
/// The parser only ever *reads* metadata through the [`AnnotationRegistry`]
/// trait; how the metadata gets there is the caller's business.
/// [`AnnotationConfigurator`] is the stock in-memory implementation:
/// entries are registered once at start-up and then read concurrently by
/// any number of parses.
///
/// Class identities are normalised without a leading `\`, so
/// `"\\App\\Route"` and `"App\\Route"` name the same entry.
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::AnnotationMetadata;

/// Read access to annotation metadata by fully-qualified class name.
pub trait AnnotationRegistry: Send + Sync {
    fn get(&self, class: &str) -> Option<Arc<AnnotationMetadata>>;
}

/// In-memory registry guarded by a read-write lock.
#[derive(Debug, Default)]
pub struct AnnotationConfigurator {
    entries: RwLock<HashMap<String, Arc<AnnotationMetadata>>>,
}

impl AnnotationConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the metadata for `meta.class`.
    pub fn register(&self, meta: AnnotationMetadata) {
        let key = normalise(&meta.class).to_string();
        self.entries.write().insert(key, Arc::new(meta));
    }

    pub fn contains(&self, class: &str) -> bool {
        self.entries.read().contains_key(normalise(class))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All registered class identities, sorted.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.entries.read().keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl AnnotationRegistry for AnnotationConfigurator {
    fn get(&self, class: &str) -> Option<Arc<AnnotationMetadata>> {
        self.entries.read().get(normalise(class)).cloned()
    }
}

impl<S: BuildHasher + Send + Sync> AnnotationRegistry for HashMap<String, Arc<AnnotationMetadata>, S> {
    fn get(&self, class: &str) -> Option<Arc<AnnotationMetadata>> {
        HashMap::get(self, normalise(class)).cloned()
    }
}

fn normalise(class: &str) -> &str {
    class.strip_prefix('\\').unwrap_or(class)
}

use std::sync::Arc;

use treecast_core::definition::ClassDefinition;

use crate::cache::DefinitionCache;

/// Prefixes every key with a version token.
///
/// Entries written under another version are never read again. They are
/// not evicted either.
#[derive(Debug)]
pub struct VersionedCache<C> {
    version: String,
    inner: C,
}

impl<C: DefinitionCache> VersionedCache<C> {
    pub fn new(version: impl Into<String>, inner: C) -> Self {
        Self {
            version: version.into(),
            inner,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn key(&self, key: &str) -> String {
        format!("{}.{key}", self.version)
    }
}

impl<C: DefinitionCache> DefinitionCache for VersionedCache<C> {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>> {
        self.inner.get(&self.key(key))
    }

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>) {
        self.inner.set(&self.key(key), definition);
    }

    fn clear(&self) {
        self.inner.clear();
    }
}

use std::sync::Arc;

use dashmap::DashMap;
use treecast_core::definition::ClassDefinition;

use crate::cache::DefinitionCache;

/// Process-lifetime in-memory tier.
#[derive(Debug, Default)]
pub struct RuntimeCache {
    entries: DashMap<String, Arc<ClassDefinition>>,
}

impl RuntimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DefinitionCache for RuntimeCache {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>) {
        self.entries.insert(key.to_string(), Arc::clone(definition));
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

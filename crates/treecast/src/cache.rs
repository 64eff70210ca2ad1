//! Caching of class definitions.
//!
//! Definitions are looked up through a chain of tiers, fastest first:
//!
//! 1. [`RuntimeCache`] - in-memory, for the lifetime of the process
//! 2. [`CompiledCache`] - compiled documents persisted through a
//!    [`CacheStorage`]
//!
//! The whole chain is wrapped in a [`VersionedCache`], so that changing the
//! version token invalidates every entry written before.

mod chain;
mod compiled;
mod runtime;
mod storage;
mod versioned;

use std::{fmt, sync::Arc};

use log::debug;
use treecast_core::{definition::ClassDefinition, types::ClassType};

use crate::{definition::ClassDefinitionRepository, error::DefinitionError};

pub use chain::ChainCache;
pub use compiled::{ClassDefinitionCompiler, CompileError, CompiledCache};
pub use runtime::RuntimeCache;
pub use storage::{CacheStorage, FileStorage, MemoryStorage};
pub use versioned::VersionedCache;

/// A key-value store of class definitions.
///
/// Writes are idempotent: setting the same key twice with equal definitions
/// has the same effect as setting it once.
pub trait DefinitionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>>;

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>);

    fn clear(&self);
}

impl<C: DefinitionCache + ?Sized> DefinitionCache for Arc<C> {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>) {
        (**self).set(key, definition);
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// Serves definitions from a cache, computing and storing them on a miss.
pub struct CacheClassDefinitionRepository<R> {
    inner: R,
    cache: Arc<dyn DefinitionCache>,
}

impl<R: ClassDefinitionRepository> CacheClassDefinitionRepository<R> {
    pub fn new(inner: R, cache: Arc<dyn DefinitionCache>) -> Self {
        Self { inner, cache }
    }

    fn key(class: &ClassType) -> String {
        format!("class-definition.{}", class.signature())
    }
}

impl<R> fmt::Debug for CacheClassDefinitionRepository<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheClassDefinitionRepository")
            .finish_non_exhaustive()
    }
}

impl<R: ClassDefinitionRepository> ClassDefinitionRepository for CacheClassDefinitionRepository<R> {
    fn for_class(&self, class: &ClassType) -> Result<Arc<ClassDefinition>, DefinitionError> {
        let key = Self::key(class);
        if let Some(definition) = self.cache.get(&key) {
            debug!(key = key; "Class definition cache hit");
            return Ok(definition);
        }

        debug!(key = key; "Class definition cache miss");
        let definition = self.inner.for_class(class)?;
        self.cache.set(&key, &definition);
        Ok(definition)
    }
}

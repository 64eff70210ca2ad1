use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use treecast_core::definition::ClassDefinition;

use crate::cache::{CacheStorage, DefinitionCache};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed compiled definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("compiled definition belongs to `{found}`, expected `{expected}`")]
    KeyMismatch { expected: String, found: String },
}

#[derive(Serialize)]
struct CompiledRef<'a> {
    key: &'a str,
    definition: &'a ClassDefinition,
}

#[derive(Deserialize)]
struct Compiled {
    key: String,
    definition: ClassDefinition,
}

/// Turns class definitions into self-describing documents and back.
///
/// A document records the key it was written under; reading it under any
/// other key fails, which catches storages whose key encoding is lossy.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassDefinitionCompiler;

impl ClassDefinitionCompiler {
    /// # Errors
    ///
    /// Returns [`CompileError::Json`] if the definition cannot be encoded.
    pub fn compile(&self, key: &str, definition: &ClassDefinition) -> Result<Vec<u8>, CompileError> {
        Ok(serde_json::to_vec(&CompiledRef { key, definition })?)
    }

    /// # Errors
    ///
    /// Returns [`CompileError::Json`] for documents that do not decode and
    /// [`CompileError::KeyMismatch`] for documents written under another key.
    pub fn decompile(&self, key: &str, bytes: &[u8]) -> Result<ClassDefinition, CompileError> {
        let compiled: Compiled = serde_json::from_slice(bytes)?;
        if compiled.key != key {
            return Err(CompileError::KeyMismatch {
                expected: key.to_string(),
                found: compiled.key,
            });
        }
        Ok(compiled.definition)
    }
}

/// Persisted tier: compiled documents kept in a [`CacheStorage`].
///
/// Storage failures and unreadable entries are logged and treated as misses.
pub struct CompiledCache {
    storage: Arc<dyn CacheStorage>,
    compiler: ClassDefinitionCompiler,
}

impl CompiledCache {
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            storage,
            compiler: ClassDefinitionCompiler,
        }
    }
}

impl DefinitionCache for CompiledCache {
    fn get(&self, key: &str) -> Option<Arc<ClassDefinition>> {
        let bytes = match self.storage.get(key) {
            Ok(bytes) => bytes?,
            Err(err) => {
                warn!(key = key, err:% = err; "Failed to read cache entry");
                return None;
            }
        };

        match self.compiler.decompile(key, &bytes) {
            Ok(definition) => Some(Arc::new(definition)),
            Err(err) => {
                warn!(key = key, err:% = err; "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn set(&self, key: &str, definition: &Arc<ClassDefinition>) {
        let bytes = match self.compiler.compile(key, definition) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key = key, err:% = err; "Failed to compile class definition");
                return;
            }
        };
        if let Err(err) = self.storage.set(key, &bytes) {
            warn!(key = key, err:% = err; "Failed to write cache entry");
        }
    }

    /// Persisted entries outlive the process; they are invalidated by
    /// changing the version token, never cleared.
    fn clear(&self) {}
}

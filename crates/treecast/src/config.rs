//! Configuration types for the mapping engine.
//!
//! All types implement [`serde::Deserialize`] with defaults for every field,
//! so a configuration file only needs to name the settings it changes.
//!
//! # Overview
//!
//! - [`MapperConfig`] - Top-level settings of a [`TreeMapper`](crate::TreeMapper).
//! - [`CoercionConfig`] - Which scalar conversions are applied to input values.
//! - [`InterfaceBinding`] - How an interface is resolved to a concrete class.
//! - [`CacheConfig`] - Where compiled class definitions are persisted.
//!
//! # Example
//!
//! ```
//! # use treecast::config::MapperConfig;
//! let config: MapperConfig = serde_json::from_str(r#"{"allow_superfluous_keys": true}"#).unwrap();
//! assert!(config.allow_superfluous_keys());
//! assert!(config.coercion().string_to_number());
//! assert_eq!(config.max_depth(), 64);
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level mapper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MapperConfig {
    /// Scalar conversion table.
    #[serde(default)]
    coercion: CoercionConfig,

    /// Accept input keys that match no parameter or shaped element.
    #[serde(default)]
    allow_superfluous_keys: bool,

    /// Implementations of interfaces, by interface name.
    #[serde(default)]
    interfaces: IndexMap<String, InterfaceBinding>,

    /// Class definition cache settings.
    #[serde(default)]
    cache: CacheConfig,

    /// Deepest nesting of nodes before mapping is aborted.
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            coercion: CoercionConfig::default(),
            allow_superfluous_keys: false,
            interfaces: IndexMap::new(),
            cache: CacheConfig::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl MapperConfig {
    pub fn coercion(&self) -> &CoercionConfig {
        &self.coercion
    }

    pub fn allow_superfluous_keys(&self) -> bool {
        self.allow_superfluous_keys
    }

    pub fn interfaces(&self) -> &IndexMap<String, InterfaceBinding> {
        &self.interfaces
    }

    pub fn cache(&self) -> &CacheConfig {
        &self.cache
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Replace the coercion table (builder style).
    pub fn with_coercion(mut self, coercion: CoercionConfig) -> Self {
        self.coercion = coercion;
        self
    }

    /// Accept or reject superfluous input keys (builder style).
    pub fn with_superfluous_keys(mut self, allow: bool) -> Self {
        self.allow_superfluous_keys = allow;
        self
    }

    /// Bind an interface to an implementation (builder style).
    pub fn with_interface(mut self, interface: impl Into<String>, binding: InterfaceBinding) -> Self {
        self.interfaces.insert(interface.into(), binding);
        self
    }

    /// Replace the cache settings (builder style).
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Set the maximum nesting depth (builder style).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Conversions applied when an input scalar does not have the exact
/// representation of the target type.
///
/// Values that already have the expected representation are always
/// accepted. Every conversion listed here is lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Numeric strings map to `int` and `float` types (`"42"` → `42`).
    string_to_number: bool,
    /// Integers map to `float` types (`3` → `3.0`).
    int_to_float: bool,
    /// Floats without a fractional part map to `int` types (`3.0` → `3`).
    float_to_int: bool,
    /// Numbers map to `string` types (`42` → `"42"`).
    number_to_string: bool,
    /// `"true"`, `"false"`, `"1"` and `"0"` map to `bool` types.
    string_to_bool: bool,
}

impl Default for CoercionConfig {
    fn default() -> Self {
        Self {
            string_to_number: true,
            int_to_float: true,
            float_to_int: false,
            number_to_string: false,
            string_to_bool: false,
        }
    }
}

impl CoercionConfig {
    /// A table that accepts only exact representations.
    pub fn strict() -> Self {
        Self {
            string_to_number: false,
            int_to_float: false,
            float_to_int: false,
            number_to_string: false,
            string_to_bool: false,
        }
    }

    /// A table with every conversion enabled.
    pub fn flexible() -> Self {
        Self {
            string_to_number: true,
            int_to_float: true,
            float_to_int: true,
            number_to_string: true,
            string_to_bool: true,
        }
    }

    pub fn string_to_number(&self) -> bool {
        self.string_to_number
    }

    pub fn int_to_float(&self) -> bool {
        self.int_to_float
    }

    pub fn float_to_int(&self) -> bool {
        self.float_to_int
    }

    pub fn number_to_string(&self) -> bool {
        self.number_to_string
    }

    pub fn string_to_bool(&self) -> bool {
        self.string_to_bool
    }
}

/// Resolution of an interface to a concrete type.
///
/// In a TOML file:
///
/// ```toml
/// [interfaces.Shape]
/// type = "Circle"
///
/// [interfaces.Event]
/// discriminator = "kind"
/// classes = { created = "Created", deleted = "Deleted" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum InterfaceBinding {
    /// Always map against this type description.
    Fixed {
        #[serde(rename = "type")]
        description: String,
    },
    /// Read `discriminator` from the input mapping and pick the type
    /// description registered for its value.
    Discriminated {
        discriminator: String,
        classes: IndexMap<String, String>,
    },
}

impl InterfaceBinding {
    pub fn fixed(description: impl Into<String>) -> Self {
        InterfaceBinding::Fixed {
            description: description.into(),
        }
    }

    pub fn discriminated<I, K, V>(discriminator: impl Into<String>, classes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        InterfaceBinding::Discriminated {
            discriminator: discriminator.into(),
            classes: classes
                .into_iter()
                .map(|(key, class)| (key.into(), class.into()))
                .collect(),
        }
    }
}

/// Class definition cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Directory where compiled definitions are written. Only the in-memory
    /// tier is used when unset.
    #[serde(default)]
    directory: Option<PathBuf>,

    /// Version token prefixed to every key. Changing it invalidates all
    /// previously persisted entries.
    #[serde(default = "default_cache_version")]
    version: String,
}

fn default_cache_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            version: default_cache_version(),
        }
    }
}

impl CacheConfig {
    pub fn new(directory: Option<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            directory,
            version: version.into(),
        }
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

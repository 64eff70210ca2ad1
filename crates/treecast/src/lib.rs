//! Treecast - map untyped JSON trees onto typed object graphs.
//!
//! The target of a mapping is a type description such as
//! `list<array{id: positive-int, tags?: list<string>}>` or `User<int>`.
//! Classes, interfaces and enumerations named by descriptions come from a
//! [`ReflectionSource`], usually a [`ClassRegistry`](registry::ClassRegistry).
//! Failures are reported with the path of every offending node.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use treecast::{
//!     MapperBuilder,
//!     registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration},
//! };
//!
//! let registry = ClassRegistry::new().with_class(
//!     ClassDeclaration::new("Point")
//!         .with_parameter(ParameterDeclaration::new("x", "int"))
//!         .with_parameter(ParameterDeclaration::new("y", "int")),
//! );
//! let mapper = MapperBuilder::new(Arc::new(registry)).build()?;
//!
//! let point = mapper.map("Point", json!({"x": 1, "y": "2"}))?;
//! assert_eq!(point.to_json(), json!({"x": 1, "y": 2}));
//!
//! let err = mapper.map("Point", json!({"x": "one"})).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "Could not map input: $.x: value 'one' is not a valid int (+1 more)"
//! );
//! # Ok::<(), treecast::TreecastError>(())
//! ```

pub mod cache;
pub mod config;
pub mod definition;
pub mod hooks;
pub mod object;
pub mod registry;

mod error;
mod mapper;
mod tree;

pub use treecast_core::{reflection, types, value};

pub use error::{DefinitionError, ErrorKind, MappingError, MappingErrors, TreecastError};
pub use mapper::TreeMapper;
pub use tree::{Path, Segment, Shell};

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use log::{debug, info};
use serde_json::Value as JsonValue;
use treecast_core::{
    reflection::{AttributesSource, ReflectionSource, SymbolSource},
    types::Type,
    value::Value,
};
use treecast_parser::{BasicSpecification, TypeParser, TypeParserFactory};

use cache::{
    CacheClassDefinitionRepository, CacheStorage, ChainCache, CompiledCache, DefinitionCache,
    FileStorage, RuntimeCache, VersionedCache,
};
use config::MapperConfig;
use definition::ReflectionClassDefinitionRepository;
use hooks::{NodeObserver, ObjectBinder, Transformer, ValueAlterer};
use object::{AttributeObjectBuilderFactory, BasicObjectBuilderFactory, CacheObjectBuilderFactory};
use tree::{
    AggregateShellVisitor, AttributeShellVisitor, CasterNodeBuilder, ClassNodeBuilder,
    EnumNodeBuilder, ErrorCatcherNodeBuilder, InterfaceShellVisitor, NodeMiddleware,
    ObjectBindingShellVisitor, ScalarNodeBuilder, ShapedArrayNodeBuilder, ShellVisitorNodeBuilder,
    TreeBuilder, UnionShellVisitor, ValueAlteringNodeBuilder, VisitorNodeBuilder,
};

/// Assembles a [`TreeMapper`] from a class source, settings and hooks.
///
/// Every cache of the mapper is created here and owned by the mapper:
/// building two mappers from one builder configuration gives two
/// independent in-memory caches, which share persisted entries only
/// through the configured [`CacheStorage`].
pub struct MapperBuilder {
    reflection: Arc<dyn ReflectionSource>,
    attributes: Arc<dyn AttributesSource>,
    config: MapperConfig,
    storage: Option<Arc<dyn CacheStorage>>,
    binders: IndexMap<String, ObjectBinder>,
    alterers: Vec<(String, ValueAlterer)>,
    observers: Vec<NodeObserver>,
    transformers: IndexMap<String, Transformer>,
}

impl MapperBuilder {
    /// Create a builder over a source of classes and their attributes.
    pub fn new<S>(source: Arc<S>) -> Self
    where
        S: ReflectionSource + AttributesSource + 'static,
    {
        Self {
            reflection: source.clone(),
            attributes: source,
            config: MapperConfig::default(),
            storage: None,
            binders: IndexMap::new(),
            alterers: Vec::new(),
            observers: Vec::new(),
            transformers: IndexMap::new(),
        }
    }

    /// Replace the settings (builder style).
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist compiled class definitions in `storage`, regardless of the
    /// configured cache directory (builder style).
    pub fn with_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build instances of `class` with `binder` instead of mapping its
    /// parameters.
    pub fn bind<F>(mut self, class: impl Into<String>, binder: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.binders.insert(class.into(), Arc::new(binder));
        self
    }

    /// Rewrite the raw input of every node requested as the type
    /// `description`, before it is mapped.
    ///
    /// The description is parsed when the mapper is built.
    pub fn alter<F>(mut self, description: impl Into<String>, alterer: F) -> Self
    where
        F: Fn(JsonValue) -> JsonValue + Send + Sync + 'static,
    {
        self.alterers.push((description.into(), Arc::new(alterer)));
        self
    }

    /// Call `observer` for every node built successfully.
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: Fn(&Shell, &Value) + Send + Sync + 'static,
    {
        self.observers.push(Arc::new(observer));
        self
    }

    /// Register a transformer, applied to the raw input of declaration
    /// sites carrying a `Transform` attribute with this name.
    pub fn transformer<F>(mut self, name: impl Into<String>, transformer: F) -> Self
    where
        F: Fn(JsonValue) -> Result<JsonValue, String> + Send + Sync + 'static,
    {
        self.transformers.insert(name.into(), Arc::new(transformer));
        self
    }

    /// Assemble the mapper.
    ///
    /// # Errors
    ///
    /// Returns [`TreecastError::TypeParsing`] if the description of a value
    /// alterer is invalid and [`TreecastError::Io`] if the configured cache
    /// directory cannot be created.
    pub fn build(self) -> Result<TreeMapper, TreecastError> {
        let symbols: Arc<dyn SymbolSource> = self.reflection.clone();
        let parsers = TypeParserFactory::new(symbols);
        let parser = parsers.get(Arc::new(BasicSpecification));

        let mut alterers = Vec::with_capacity(self.alterers.len());
        for (description, alterer) in self.alterers {
            let ty: Type = parser
                .parse(&description)
                .map_err(|err| TreecastError::new_type_parsing(err, description.as_str()))?;
            alterers.push((ty, alterer));
        }

        let config = self.config;
        let storage = match (self.storage, config.cache().directory()) {
            (Some(storage), _) => Some(storage),
            (None, Some(directory)) => {
                let storage: Arc<dyn CacheStorage> = Arc::new(FileStorage::new(directory)?);
                Some(storage)
            }
            (None, None) => None,
        };

        let mut tiers: Vec<Box<dyn DefinitionCache>> = vec![Box::new(RuntimeCache::new())];
        if let Some(storage) = storage {
            tiers.push(Box::new(CompiledCache::new(storage)));
        }
        debug!(tiers = tiers.len(), version = config.cache().version(); "Class definition cache ready");
        let cache = VersionedCache::new(config.cache().version(), ChainCache::new(tiers));

        let repository = CacheClassDefinitionRepository::new(
            ReflectionClassDefinitionRepository::new(self.reflection.clone(), self.attributes)
                .with_parsers(parsers.clone()),
            Arc::new(cache),
        );
        let factory = CacheObjectBuilderFactory::new(AttributeObjectBuilderFactory::new(
            BasicObjectBuilderFactory::new(self.reflection.clone()),
            self.reflection,
        ));

        let coercion = *config.coercion();
        let permissive = config.allow_superfluous_keys();
        let visitor = AggregateShellVisitor::new(vec![
            Box::new(UnionShellVisitor::new(coercion)),
            Box::new(InterfaceShellVisitor::new(
                config.interfaces().clone(),
                parsers.clone(),
            )),
            Box::new(AttributeShellVisitor::new(parsers, self.transformers)),
            Box::new(ObjectBindingShellVisitor::new(self.binders)),
        ]);
        let stages: Vec<Box<dyn NodeMiddleware>> = vec![
            Box::new(ValueAlteringNodeBuilder::new(alterers)),
            Box::new(VisitorNodeBuilder::new(self.observers)),
            Box::new(ShellVisitorNodeBuilder::new(visitor)),
            Box::new(ErrorCatcherNodeBuilder),
        ];
        let caster = CasterNodeBuilder::new(
            ScalarNodeBuilder::new(coercion),
            ShapedArrayNodeBuilder::new(permissive),
            EnumNodeBuilder::new(coercion),
            ClassNodeBuilder::new(Arc::new(repository), Arc::new(factory), permissive),
        );

        info!(max_depth = config.max_depth(), permissive = permissive; "Mapper built");
        Ok(TreeMapper::new(
            parser,
            TreeBuilder::new(stages, caster, config.max_depth()),
        ))
    }
}

impl fmt::Debug for MapperBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperBuilder")
            .field("config", &self.config)
            .field("binders", &self.binders.keys().collect::<Vec<_>>())
            .field("transformers", &self.transformers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

//! The [`ClassDefinition`] type.

use serde::{Deserialize, Serialize};

use crate::{
    definition::{Attributes, Parameters},
    types::ClassType,
};

/// How instances of a class are constructed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstructionStrategy {
    /// Use the primary constructor.
    #[default]
    Constructor,
    /// Use the named static factory.
    Factory(String),
}

/// A static factory declared for a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryDefinition {
    name: String,
    parameters: Parameters,
}

impl FactoryDefinition {
    pub fn new(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// The introspected description of a constructible class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    class_type: ClassType,
    attributes: Attributes,
    parameters: Parameters,
    factories: Vec<FactoryDefinition>,
    strategy: ConstructionStrategy,
    instantiable: bool,
}

impl ClassDefinition {
    /// Create a definition built through its primary constructor.
    pub fn new(class_type: ClassType, attributes: Attributes, parameters: Parameters) -> Self {
        Self {
            class_type,
            attributes,
            parameters,
            factories: Vec::new(),
            strategy: ConstructionStrategy::Constructor,
            instantiable: true,
        }
    }

    /// Declare a factory (builder style).
    pub fn with_factory(mut self, factory: FactoryDefinition) -> Self {
        self.factories.push(factory);
        self
    }

    /// Select the construction strategy (builder style).
    pub fn with_strategy(mut self, strategy: ConstructionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set whether the primary constructor can be invoked (builder style).
    pub fn with_instantiable(mut self, instantiable: bool) -> Self {
        self.instantiable = instantiable;
        self
    }

    /// Name of the class.
    pub fn name(&self) -> &str {
        self.class_type.name()
    }

    pub fn class_type(&self) -> &ClassType {
        &self.class_type
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Parameters of the primary constructor.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn factories(&self) -> &[FactoryDefinition] {
        &self.factories
    }

    /// Find a declared factory by name.
    pub fn factory(&self, name: &str) -> Option<&FactoryDefinition> {
        self.factories.iter().find(|factory| factory.name() == name)
    }

    pub fn strategy(&self) -> &ConstructionStrategy {
        &self.strategy
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }
}

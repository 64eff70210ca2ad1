//! Explicit declaration of classes, interfaces and enumerations.
//!
//! [`ClassRegistry`] is the introspection source of the engine: it answers
//! symbol lookups for the type parser, reports constructor and factory
//! parameters, attributes, and performs instantiation.
//!
//! Classes without an explicit constructor body are built as
//! [`Value::Object`] holding the mapped arguments.
//!
//! # Example
//!
//! ```
//! # use treecast::registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration};
//! # use treecast_core::value::Value;
//! let registry = ClassRegistry::new().with_class(
//!     ClassDeclaration::new("Point")
//!         .with_parameter(ParameterDeclaration::new("x", "int"))
//!         .with_parameter(ParameterDeclaration::new("y", "int").with_default(Value::Int(0))),
//! );
//! assert!(registry.class("Point").is_some());
//! ```

use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use treecast_core::{
    definition::{Attribute, Attributes},
    reflection::{
        Arguments, AttributesSource, Callable, DeclarationSite, ReflectedParameter,
        ReflectionSource, Symbol, SymbolSource,
    },
    types::EnumCase,
    value::{Object, Value},
};

/// Body of a constructor or factory.
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> Result<Value, String> + Send + Sync>;

/// A declared constructor or factory parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDeclaration {
    parameter: ReflectedParameter,
    attributes: Vec<Attribute>,
}

impl ParameterDeclaration {
    /// A required parameter of the given type description.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            parameter: ReflectedParameter::new(name, declared_type),
            attributes: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.parameter = self.parameter.with_default(default);
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn name(&self) -> &str {
        self.parameter.name()
    }
}

#[derive(Clone, Default)]
struct CallableDeclaration {
    parameters: Vec<ParameterDeclaration>,
    body: Option<ConstructorFn>,
}

/// Everything known about one class.
#[derive(Clone)]
pub struct ClassDeclaration {
    name: String,
    templates: Vec<String>,
    attributes: Vec<Attribute>,
    constructor: CallableDeclaration,
    factories: IndexMap<String, CallableDeclaration>,
    instantiable: bool,
}

impl ClassDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Vec::new(),
            attributes: Vec::new(),
            constructor: CallableDeclaration::default(),
            factories: IndexMap::new(),
            instantiable: true,
        }
    }

    /// Declare the template names of a generic class.
    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }

    /// Append a constructor parameter.
    pub fn with_parameter(mut self, parameter: ParameterDeclaration) -> Self {
        self.constructor.parameters.push(parameter);
        self
    }

    /// Attach a class attribute.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Replace the default constructor body.
    pub fn with_constructor<F>(mut self, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.constructor.body = Some(Arc::new(body));
        self
    }

    /// Declare a static factory.
    pub fn with_factory<F>(
        mut self,
        method: impl Into<String>,
        parameters: Vec<ParameterDeclaration>,
        body: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.factories.insert(
            method.into(),
            CallableDeclaration {
                parameters,
                body: Some(Arc::new(body)),
            },
        );
        self
    }

    /// Declare a factory building a [`Value::Object`] from its arguments.
    pub fn with_plain_factory(
        mut self,
        method: impl Into<String>,
        parameters: Vec<ParameterDeclaration>,
    ) -> Self {
        self.factories.insert(
            method.into(),
            CallableDeclaration {
                parameters,
                body: None,
            },
        );
        self
    }

    /// Mark the constructor as unusable, as for abstract classes.
    pub fn not_instantiable(mut self) -> Self {
        self.instantiable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn callable(&self, callable: &Callable) -> Option<&CallableDeclaration> {
        match callable {
            Callable::Constructor { .. } => Some(&self.constructor),
            Callable::Factory { method, .. } => self.factories.get(method),
        }
    }
}

impl fmt::Debug for ClassDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDeclaration")
            .field("name", &self.name)
            .field("templates", &self.templates)
            .field("attributes", &self.attributes)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("instantiable", &self.instantiable)
            .finish_non_exhaustive()
    }
}

/// In-memory registry of declared symbols.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassDeclaration>,
    interfaces: IndexMap<String, Vec<Attribute>>,
    enums: IndexMap<String, Vec<EnumCase>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, class: ClassDeclaration) -> Self {
        self.classes.insert(class.name.clone(), class);
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.insert(name.into(), Vec::new());
        self
    }

    pub fn with_enum(mut self, name: impl Into<String>, cases: Vec<EnumCase>) -> Self {
        self.enums.insert(name.into(), cases);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassDeclaration> {
        self.classes.get(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.interfaces.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SymbolSource for ClassRegistry {
    fn symbol(&self, name: &str) -> Option<Symbol> {
        if let Some(class) = self.classes.get(name) {
            return Some(Symbol::class(name).with_templates(class.templates.clone()));
        }
        if self.interfaces.contains_key(name) {
            return Some(Symbol::interface(name));
        }
        self.enums
            .get(name)
            .map(|cases| Symbol::enumeration(name, cases.clone()))
    }
}

impl ReflectionSource for ClassRegistry {
    fn parameters_of(&self, callable: &Callable) -> Option<Vec<ReflectedParameter>> {
        let declaration = self.classes.get(callable.class())?.callable(callable)?;
        Some(
            declaration
                .parameters
                .iter()
                .map(|parameter| parameter.parameter.clone())
                .collect(),
        )
    }

    fn is_instantiable(&self, class: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|declaration| declaration.instantiable)
    }

    fn instantiate(&self, callable: &Callable, arguments: Arguments) -> Result<Value, String> {
        let declaration = self
            .classes
            .get(callable.class())
            .and_then(|class| class.callable(callable))
            .ok_or_else(|| format!("`{callable}` is not declared"))?;

        match &declaration.body {
            Some(body) => body(arguments),
            None => Ok(Value::Object(Object::new(callable.class(), arguments))),
        }
    }
}

impl AttributesSource for ClassRegistry {
    fn attributes_for(&self, site: &DeclarationSite) -> Attributes {
        match site {
            DeclarationSite::Class(name) => self
                .classes
                .get(name)
                .map(|class| class.attributes.clone())
                .or_else(|| self.interfaces.get(name).cloned())
                .unwrap_or_default()
                .into_iter()
                .collect(),
            DeclarationSite::Parameter {
                callable,
                parameter,
            } => self
                .classes
                .get(callable.class())
                .and_then(|class| class.callable(callable))
                .and_then(|declaration| {
                    declaration
                        .parameters
                        .iter()
                        .find(|declared| declared.name() == parameter)
                })
                .map(|declared| declared.attributes.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use treecast_core::types::EnumBacking;

    use super::*;

    fn registry() -> ClassRegistry {
        ClassRegistry::new()
            .with_class(
                ClassDeclaration::new("Box")
                    .with_templates(["T"])
                    .with_parameter(ParameterDeclaration::new("value", "T").with_attribute(
                        Attribute::Transform {
                            name: "trim".to_string(),
                        },
                    ))
                    .with_plain_factory("empty", Vec::new()),
            )
            .with_interface("Shape")
            .with_enum(
                "Suit",
                vec![EnumCase::backed("Hearts", EnumBacking::String("H".to_string()))],
            )
    }

    #[test]
    fn test_symbols() {
        let registry = registry();

        assert_eq!(registry.symbol("Box").unwrap().templates(), ["T"]);
        assert_eq!(
            registry.symbol("Shape").map(|symbol| symbol.kind()),
            Some(treecast_core::reflection::SymbolKind::Interface)
        );
        assert_eq!(registry.symbol("Suit").unwrap().cases().len(), 1);
        assert_eq!(registry.symbol("Nope"), None);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_parameters_of_constructor_and_factory() {
        let registry = registry();

        let constructor = registry
            .parameters_of(&Callable::constructor("Box"))
            .unwrap();
        assert_eq!(constructor[0].declared_type(), "T");
        assert_eq!(
            registry.parameters_of(&Callable::factory("Box", "empty")),
            Some(Vec::new())
        );
        assert_eq!(registry.parameters_of(&Callable::factory("Box", "full")), None);
    }

    #[test]
    fn test_parameter_attributes() {
        let attributes = registry().attributes_for(&DeclarationSite::Parameter {
            callable: Callable::constructor("Box"),
            parameter: "value".to_string(),
        });

        assert_eq!(attributes.len(), 1);
        assert!(attributes.has(treecast_core::definition::AttributeKind::Transform));
    }

    #[test]
    fn test_default_instantiation_builds_object() {
        let mut arguments = Arguments::new();
        arguments.insert("value".to_string(), Value::Int(1));

        let value = registry()
            .instantiate(&Callable::constructor("Box"), arguments)
            .unwrap();

        let object = value.as_object().unwrap();
        assert_eq!(object.class(), "Box");
        assert_eq!(object.field("value"), Some(&Value::Int(1)));
    }
}

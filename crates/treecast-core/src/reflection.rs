//! Collaborator interfaces through which classes are introspected.
//!
//! Rust has no runtime reflection, so the engine asks these traits instead:
//!
//! - [`SymbolSource`] - what a name in a type description refers to.
//! - [`ReflectionSource`] - constructor and factory parameters, and
//!   instantiation of classes from mapped arguments.
//! - [`AttributesSource`] - attribute metadata of a declaration site.
//!
//! Implementations must be deterministic: the same question always yields
//! the same answer, which is what makes definitions cacheable.

use std::fmt;

use indexmap::IndexMap;

use crate::{definition::Attributes, types::EnumCase, value::Value};

/// Mapped arguments passed to a constructor or factory, keyed by parameter name.
pub type Arguments = IndexMap<String, Value>;

/// What kind of declaration a symbol is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
}

/// A named declaration that type descriptions can reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
    templates: Vec<String>,
    cases: Vec<EnumCase>,
}

impl Symbol {
    /// A class symbol.
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Class)
    }

    /// An interface symbol.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, SymbolKind::Interface)
    }

    /// An enumeration symbol with its cases.
    pub fn enumeration(name: impl Into<String>, cases: Vec<EnumCase>) -> Self {
        Self {
            cases,
            ..Self::new(name, SymbolKind::Enum)
        }
    }

    /// Declare template parameters (builder style).
    pub fn with_templates(mut self, templates: Vec<String>) -> Self {
        self.templates = templates;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Declared template parameter names, in order.
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
            templates: Vec::new(),
            cases: Vec::new(),
        }
    }
}

/// Resolves names found in type descriptions.
pub trait SymbolSource: Send + Sync {
    /// Returns the symbol declared under `name`, if any.
    fn symbol(&self, name: &str) -> Option<Symbol>;
}

/// A constructor or static factory of a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Callable {
    Constructor { class: String },
    Factory { class: String, method: String },
}

impl Callable {
    pub fn constructor(class: impl Into<String>) -> Self {
        Callable::Constructor {
            class: class.into(),
        }
    }

    pub fn factory(class: impl Into<String>, method: impl Into<String>) -> Self {
        Callable::Factory {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Name of the class this callable belongs to.
    pub fn class(&self) -> &str {
        match self {
            Callable::Constructor { class } | Callable::Factory { class, .. } => class,
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Constructor { class } => write!(f, "{class}::new"),
            Callable::Factory { class, method } => write!(f, "{class}::{method}"),
        }
    }
}

/// A parameter as reported by a [`ReflectionSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedParameter {
    name: String,
    declared_type: String,
    default: Option<Value>,
}

impl ReflectedParameter {
    /// A parameter with its declared type description.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            default: None,
        }
    }

    /// Give the parameter a default value (builder style).
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type, as an unparsed description.
    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Introspection of classes.
pub trait ReflectionSource: SymbolSource {
    /// Parameters of a constructor or factory, in declaration order.
    ///
    /// Returns `None` when the callable does not exist.
    fn parameters_of(&self, callable: &Callable) -> Option<Vec<ReflectedParameter>>;

    /// Returns `true` if the primary constructor of `class` can be invoked.
    fn is_instantiable(&self, class: &str) -> bool;

    /// Invoke a constructor or factory with mapped arguments.
    ///
    /// # Errors
    ///
    /// Returns a message when the callable rejects the arguments.
    fn instantiate(&self, callable: &Callable, arguments: Arguments) -> Result<Value, String>;
}

/// A place attributes can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeclarationSite {
    Class(String),
    Parameter { callable: Callable, parameter: String },
}

impl fmt::Display for DeclarationSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationSite::Class(class) => write!(f, "{class}"),
            DeclarationSite::Parameter {
                callable,
                parameter,
            } => write!(f, "{callable}(${parameter})"),
        }
    }
}

/// Provides attribute metadata.
pub trait AttributesSource: Send + Sync {
    /// Attributes of the declaration site, in source order.
    fn attributes_for(&self, site: &DeclarationSite) -> Attributes;
}

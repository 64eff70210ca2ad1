//! Parsing contexts.
//!
//! A [`Specification`] tells the parser what names mean in a given context
//! beyond the built-in keywords and the symbols of the
//! [`SymbolSource`](treecast_core::reflection::SymbolSource). The parameter
//! types of a generic class, for instance, are parsed with a
//! [`TemplateSpecification`] binding each template to the class' generic
//! arguments.

use std::fmt::Debug;

use indexmap::IndexMap;
use treecast_core::types::{ClassType, Type};

pub trait Specification: Debug + Send + Sync {
    /// Type bound to `name` if it is a template of this context.
    fn template(&self, name: &str) -> Option<&Type>;

    /// Stable identity of this context.
    ///
    /// Two specifications with the same signature must resolve every name
    /// the same way, since parse results are cached under it.
    fn signature(&self) -> String;
}

/// The context-free specification: keywords and symbols only.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSpecification;

impl Specification for BasicSpecification {
    fn template(&self, _name: &str) -> Option<&Type> {
        None
    }

    fn signature(&self) -> String {
        "basic".to_string()
    }
}

/// Resolves template names to bound types.
#[derive(Debug, Clone, Default)]
pub struct TemplateSpecification {
    templates: IndexMap<String, Type>,
}

impl TemplateSpecification {
    pub fn new(templates: IndexMap<String, Type>) -> Self {
        Self { templates }
    }

    /// Bind the templates declared by a class to the generics of `class`.
    ///
    /// Templates without a binding resolve to `mixed`.
    pub fn for_class(declared: &[String], class: &ClassType) -> Self {
        let templates = declared
            .iter()
            .map(|template| {
                let bound = class
                    .generics()
                    .get(template)
                    .cloned()
                    .unwrap_or(Type::Mixed);
                (template.clone(), bound)
            })
            .collect();
        Self { templates }
    }

    pub fn templates(&self) -> &IndexMap<String, Type> {
        &self.templates
    }
}

impl Specification for TemplateSpecification {
    fn template(&self, name: &str) -> Option<&Type> {
        self.templates.get(name)
    }

    fn signature(&self) -> String {
        let bindings = self
            .templates
            .iter()
            .map(|(name, ty)| format!("{name}={ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("templates<{bindings}>")
    }
}

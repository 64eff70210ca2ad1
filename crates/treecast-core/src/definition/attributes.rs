//! Attribute metadata attached to declaration sites.

use std::slice;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single attribute attached to a class or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attribute {
    /// Build the class through the named static factory instead of its constructor.
    Factory { method: String },
    /// Map the declaration site against this type description instead of its declared type.
    Type { description: String },
    /// Pre-transform the raw input with the named transformer.
    Transform { name: String },
    /// Free-form metadata, carried along but not interpreted by the engine.
    Custom {
        name: String,
        #[serde(default)]
        value: JsonValue,
    },
}

impl Attribute {
    /// The kind of this attribute, used for filtering.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Factory { .. } => AttributeKind::Factory,
            Attribute::Type { .. } => AttributeKind::Type,
            Attribute::Transform { .. } => AttributeKind::Transform,
            Attribute::Custom { .. } => AttributeKind::Custom,
        }
    }
}

/// Discriminant of [`Attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Factory,
    Type,
    Transform,
    Custom,
}

/// The ordered attributes of one declaration site.
///
/// Source order is preserved and attributes of the same kind are not
/// deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self(attributes)
    }

    /// An empty container.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if at least one attribute of the given kind is present.
    pub fn has(&self, kind: AttributeKind) -> bool {
        self.0.iter().any(|attribute| attribute.kind() == kind)
    }

    /// Iterate over the attributes of the given kind, in source order.
    pub fn of_kind(&self, kind: AttributeKind) -> impl Iterator<Item = &Attribute> {
        self.0.iter().filter(move |attribute| attribute.kind() == kind)
    }

    pub fn iter(&self) -> slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

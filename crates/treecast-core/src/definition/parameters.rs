//! Parameter definitions and the ordered [`Parameters`] container.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{definition::Attributes, types::Type, value::Value};

/// Lookup of a parameter name that is not part of a [`Parameters`] container.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("parameter `{name}` not found")]
pub struct ParameterNotFound {
    name: String,
}

impl ParameterNotFound {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A single constructor or factory parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    name: String,
    signature: String,
    ty: Type,
    default: Option<Value>,
    attributes: Attributes,
}

impl ParameterDefinition {
    /// Create a required parameter.
    ///
    /// # Arguments
    ///
    /// * `name` - Parameter name, also the input key it is read from.
    /// * `signature` - Human readable location, e.g. `Point::new($x)`.
    /// * `ty` - Declared type of the parameter.
    pub fn new(name: impl Into<String>, signature: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            signature: signature.into(),
            ty,
            default: None,
            attributes: Attributes::empty(),
        }
    }

    /// Make the parameter optional with the given default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach attributes to the parameter.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// A parameter is optional when it declares a default value.
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Parameters keyed by name, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ParameterDefinition>", into = "Vec<ParameterDefinition>")]
pub struct Parameters {
    parameters: IndexMap<String, ParameterDefinition>,
}

impl Parameters {
    pub fn new(parameters: impl IntoIterator<Item = ParameterDefinition>) -> Self {
        Self {
            parameters: parameters
                .into_iter()
                .map(|parameter| (parameter.name.clone(), parameter))
                .collect(),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Look up a parameter by name.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterNotFound`] if no parameter has this name.
    pub fn get(&self, name: &str) -> Result<&ParameterDefinition, ParameterNotFound> {
        self.parameters.get(name).ok_or_else(|| ParameterNotFound {
            name: name.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.parameters.values()
    }

    /// The first declared parameter.
    pub fn first(&self) -> Option<&ParameterDefinition> {
        self.parameters.first().map(|(_, parameter)| parameter)
    }
}

impl From<Vec<ParameterDefinition>> for Parameters {
    fn from(parameters: Vec<ParameterDefinition>) -> Self {
        Self::new(parameters)
    }
}

impl From<Parameters> for Vec<ParameterDefinition> {
    fn from(parameters: Parameters) -> Self {
        parameters.parameters.into_values().collect()
    }
}

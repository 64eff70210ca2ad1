//! Schema files declaring the classes a document is mapped onto.
//!
//! A schema is a TOML file with three optional sections:
//!
//! ```toml
//! interfaces = ["Animal"]
//!
//! [classes.Point]
//! parameters = [
//!     { name = "x", type = "int" },
//!     { name = "y", type = "int", default = 0 },
//! ]
//!
//! [classes.Money]
//! attributes = [{ kind = "factory", method = "of" }]
//! factories.of = [{ name = "amount", type = "float" }]
//!
//! [enums.Suit]
//! cases = [{ name = "Hearts", value = "H" }, { name = "Spades", value = "S" }]
//! ```
//!
//! Classes without a constructor body are built as plain objects holding
//! their mapped arguments.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

use treecast::{
    TreecastError,
    registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration},
    types::EnumCase,
    value::Value,
};
use treecast_core::definition::Attribute;

/// Schema-related errors for CLI
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to parse schema {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Symbol `{0}` is declared more than once")]
    Duplicate(String),
}

impl From<SchemaError> for TreecastError {
    fn from(err: SchemaError) -> Self {
        TreecastError::Config(err.to_string())
    }
}

/// The declarations of a schema file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Schema {
    #[serde(default)]
    classes: BTreeMap<String, ClassSchema>,
    #[serde(default)]
    interfaces: Vec<String>,
    #[serde(default)]
    enums: BTreeMap<String, EnumSchema>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClassSchema {
    templates: Vec<String>,
    parameters: Vec<ParameterSchema>,
    attributes: Vec<Attribute>,
    factories: BTreeMap<String, Vec<ParameterSchema>>,
    #[serde(rename = "abstract")]
    is_abstract: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterSchema {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    default: Option<JsonValue>,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl ParameterSchema {
    fn into_declaration(self) -> ParameterDeclaration {
        let mut parameter = ParameterDeclaration::new(self.name, self.ty);
        if let Some(default) = self.default {
            parameter = parameter.with_default(Value::from_json(&default));
        }
        self.attributes
            .into_iter()
            .fold(parameter, ParameterDeclaration::with_attribute)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumSchema {
    cases: Vec<EnumCase>,
}

impl Schema {
    /// Parse a schema from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] for malformed TOML or unknown fields.
    pub fn parse(path: &Path, content: &str) -> Result<Self, SchemaError> {
        toml::from_str(content).map_err(|e| SchemaError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`TreecastError::Io`] if the file cannot be read and
    /// [`TreecastError::Config`] if it is not a valid schema.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreecastError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(path, &content)?)
    }

    /// Register every declaration of the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Duplicate`] if a name is declared as two
    /// different kinds of symbol.
    pub fn into_registry(self) -> Result<ClassRegistry, SchemaError> {
        let mut names = BTreeSet::new();
        let declared = self
            .classes
            .keys()
            .chain(self.enums.keys())
            .chain(self.interfaces.iter());
        for name in declared {
            if !names.insert(name.as_str()) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }
        debug!(
            classes = self.classes.len(),
            interfaces = self.interfaces.len(),
            enums = self.enums.len();
            "Schema loaded"
        );

        let mut registry = ClassRegistry::new();
        for (name, class) in self.classes {
            registry = registry.with_class(class.into_declaration(name));
        }
        for name in self.interfaces {
            registry = registry.with_interface(name);
        }
        for (name, schema) in self.enums {
            registry = registry.with_enum(name, schema.cases);
        }
        Ok(registry)
    }
}

impl ClassSchema {
    fn into_declaration(self, name: String) -> ClassDeclaration {
        let mut class = ClassDeclaration::new(name).with_templates(self.templates);
        for parameter in self.parameters {
            class = class.with_parameter(parameter.into_declaration());
        }
        for attribute in self.attributes {
            class = class.with_attribute(attribute);
        }
        for (method, parameters) in self.factories {
            let parameters = parameters
                .into_iter()
                .map(ParameterSchema::into_declaration)
                .collect();
            class = class.with_plain_factory(method, parameters);
        }
        if self.is_abstract {
            class = class.not_instantiable();
        }
        class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<Schema, SchemaError> {
        Schema::parse(Path::new("schema.toml"), content)
    }

    #[test]
    fn test_declarations_are_registered() {
        let registry = parse(
            r#"
            interfaces = ["Shape"]

            [classes.Point]
            parameters = [
                { name = "x", type = "int" },
                { name = "y", type = "int", default = 0 },
            ]

            [classes.Circle]
            parameters = [{ name = "radius", type = "positive-int" }]

            [enums.Suit]
            cases = [{ name = "Hearts", value = "H" }, { name = "Spades" }]
            "#,
        )
        .unwrap()
        .into_registry()
        .unwrap();

        assert_eq!(registry.len(), 4);
        assert!(registry.class("Point").is_some());
        assert!(registry.class("Shape").is_none());
    }

    #[test]
    fn test_attributes_are_tagged_by_kind() {
        let schema = parse(
            r#"
            [classes.Money]
            attributes = [{ kind = "factory", method = "of" }]
            factories.of = [
                { name = "amount", type = "float", attributes = [{ kind = "transform", name = "trim" }] },
            ]
            "#,
        )
        .unwrap();

        let money = &schema.classes["Money"];
        assert_eq!(
            money.attributes,
            [Attribute::Factory {
                method: "of".to_string()
            }]
        );
        assert_eq!(money.factories["of"][0].attributes.len(), 1);
    }

    #[test]
    fn test_duplicate_symbol_is_rejected() {
        let err = parse(
            r#"
            interfaces = ["Point"]

            [classes.Point]
            "#,
        )
        .unwrap()
        .into_registry()
        .unwrap_err();

        assert_eq!(err.to_string(), "Symbol `Point` is declared more than once");
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let err = parse("[classes.Point]\nparams = []").unwrap_err();

        assert!(matches!(err, SchemaError::Parse { .. }));
    }
}

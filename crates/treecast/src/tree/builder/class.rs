use std::sync::Arc;

use log::trace;
use serde_json::{Map, Value as JsonValue};
use treecast_core::{
    definition::{ParameterDefinition, Parameters},
    reflection::Arguments,
    types::ClassType,
    value::Value,
};

use crate::{
    definition::ClassDefinitionRepository,
    error::{ErrorKind, MappingError},
    object::{ObjectBuilder, ObjectBuilderError, ObjectBuilderFactory},
    tree::{Children, Failure, Shell, TreeBuilder, describe},
};

/// Class nodes: one child per constructor or factory parameter.
pub(crate) struct ClassNodeBuilder {
    repository: Arc<dyn ClassDefinitionRepository>,
    factory: Arc<dyn ObjectBuilderFactory>,
    allow_superfluous_keys: bool,
}

impl ClassNodeBuilder {
    pub(crate) fn new(
        repository: Arc<dyn ClassDefinitionRepository>,
        factory: Arc<dyn ObjectBuilderFactory>,
        allow_superfluous_keys: bool,
    ) -> Self {
        Self {
            repository,
            factory,
            allow_superfluous_keys,
        }
    }

    pub(super) fn build(
        &self,
        class: &ClassType,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Value, Failure> {
        let definition = self.repository.for_class(class).map_err(Failure::fatal)?;
        let builder = self.factory.for_class(&definition).map_err(reject)?;

        let arguments = match bare_parameter(builder.parameters(), shell.input()) {
            Some(parameter) => {
                trace!(class = class.name(), parameter = parameter.name(); "Mapping bare value");
                let child = shell
                    .child(shell.path().clone(), parameter.ty().clone(), shell.input().cloned())
                    .with_attributes(parameter.attributes().clone());
                let value = tree.build(child)?;
                Arguments::from([(parameter.name().to_string(), value)])
            }
            None => match shell.input() {
                Some(JsonValue::Object(entries)) => self.arguments(builder.as_ref(), entries, shell, tree)?,
                other => {
                    return Err(Failure::message(
                        ErrorKind::InvalidMapping,
                        format!("expected a mapping, got {}", describe(other)),
                    ));
                }
            },
        };

        builder.build(arguments).map_err(reject)
    }

    fn arguments(
        &self,
        builder: &dyn ObjectBuilder,
        entries: &Map<String, JsonValue>,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Arguments, Failure> {
        let parameters = builder.parameters();
        let mut children = Children::default();
        let mut arguments = Arguments::with_capacity(parameters.len());

        for parameter in parameters.iter() {
            let path = shell.path().key(parameter.name());
            let input = match (entries.get(parameter.name()), parameter.default_value()) {
                (Some(item), _) => Some(item.clone()),
                (None, Some(default)) => {
                    arguments.insert(parameter.name().to_string(), default.clone());
                    continue;
                }
                (None, None) => None,
            };

            let child = shell
                .child(path.clone(), parameter.ty().clone(), input)
                .with_attributes(parameter.attributes().clone());
            if let Some(value) = children.record(&path, tree.build(child))? {
                arguments.insert(parameter.name().to_string(), value);
            }
        }

        if !self.allow_superfluous_keys {
            for key in entries.keys().filter(|key| !parameters.has(key.as_str())) {
                children.push(MappingError::new(
                    shell.path().key(key.as_str()),
                    ErrorKind::UnexpectedKey,
                    format!("unexpected key `{key}`"),
                ));
            }
        }
        children.finish()?;

        Ok(arguments)
    }
}

/// The parameter of a single-parameter class that takes the whole input,
/// unless the input is a mapping keyed by that parameter.
fn bare_parameter<'a>(
    parameters: &'a Parameters,
    input: Option<&JsonValue>,
) -> Option<&'a ParameterDefinition> {
    if parameters.len() != 1 {
        return None;
    }
    let parameter = parameters.first()?;
    match input {
        Some(JsonValue::Object(entries)) if entries.contains_key(parameter.name()) => None,
        _ => Some(parameter),
    }
}

fn reject(err: ObjectBuilderError) -> Failure {
    Failure::message(err.kind(), err.to_string())
}

use std::{fmt, sync::Arc};

use treecast_core::{
    definition::Parameters,
    reflection::{Arguments, Callable, ReflectionSource},
    value::Value,
};

use crate::object::ObjectBuilderError;

/// Builds instances of one class.
pub trait ObjectBuilder: Send + Sync {
    /// The parameters to map from the input.
    fn parameters(&self) -> &Parameters;

    /// Build an instance.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectBuilderError::InvalidConstructorArguments`] when a
    /// required argument is missing and
    /// [`ObjectBuilderError::ConstructionFailed`] when the instance cannot
    /// be built from the given values.
    fn build(&self, arguments: Arguments) -> Result<Value, ObjectBuilderError>;
}

/// Calls a constructor or factory through a [`ReflectionSource`].
pub struct ReflectionObjectBuilder {
    callable: Callable,
    parameters: Parameters,
    reflection: Arc<dyn ReflectionSource>,
}

impl ReflectionObjectBuilder {
    pub fn new(
        callable: Callable,
        parameters: Parameters,
        reflection: Arc<dyn ReflectionSource>,
    ) -> Self {
        Self {
            callable,
            parameters,
            reflection,
        }
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }
}

impl fmt::Debug for ReflectionObjectBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionObjectBuilder")
            .field("callable", &self.callable)
            .field("parameters", &self.parameters.len())
            .finish_non_exhaustive()
    }
}

impl ObjectBuilder for ReflectionObjectBuilder {
    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn build(&self, mut arguments: Arguments) -> Result<Value, ObjectBuilderError> {
        let mut ordered = Arguments::with_capacity(self.parameters.len());
        for parameter in self.parameters.iter() {
            let value = match (arguments.shift_remove(parameter.name()), parameter.default_value()) {
                (Some(value), _) => value,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(ObjectBuilderError::InvalidConstructorArguments {
                        callable: self.callable.to_string(),
                        reason: format!("missing argument `{}`", parameter.name()),
                    });
                }
            };
            ordered.insert(parameter.name().to_string(), value);
        }

        if let Some(extra) = arguments.keys().next() {
            return Err(ObjectBuilderError::InvalidConstructorArguments {
                callable: self.callable.to_string(),
                reason: format!("unknown argument `{extra}`"),
            });
        }

        self.reflection
            .instantiate(&self.callable, ordered)
            .map_err(|reason| ObjectBuilderError::ConstructionFailed {
                callable: self.callable.to_string(),
                reason,
            })
    }
}

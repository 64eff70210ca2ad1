use std::{fmt, sync::Arc};

use dashmap::DashMap;
use log::debug;
use treecast_core::{
    definition::{ClassDefinition, ConstructionStrategy},
    reflection::{Callable, ReflectionSource},
};

use crate::object::{ObjectBuilder, ObjectBuilderError, ReflectionObjectBuilder};

/// Creates the [`ObjectBuilder`] of a class.
pub trait ObjectBuilderFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ObjectBuilderError::ClassNotInstantiable`] when the class
    /// has no usable way of being constructed.
    fn for_class(
        &self,
        definition: &Arc<ClassDefinition>,
    ) -> Result<Arc<dyn ObjectBuilder>, ObjectBuilderError>;
}

/// Builds through the primary constructor.
pub struct BasicObjectBuilderFactory {
    reflection: Arc<dyn ReflectionSource>,
}

impl BasicObjectBuilderFactory {
    pub fn new(reflection: Arc<dyn ReflectionSource>) -> Self {
        Self { reflection }
    }
}

impl ObjectBuilderFactory for BasicObjectBuilderFactory {
    fn for_class(
        &self,
        definition: &Arc<ClassDefinition>,
    ) -> Result<Arc<dyn ObjectBuilder>, ObjectBuilderError> {
        if !definition.is_instantiable() {
            return Err(ObjectBuilderError::ClassNotInstantiable {
                class: definition.name().to_string(),
            });
        }

        Ok(Arc::new(ReflectionObjectBuilder::new(
            Callable::constructor(definition.name()),
            definition.parameters().clone(),
            Arc::clone(&self.reflection),
        )))
    }
}

/// Builds through the factory selected by a `Factory` attribute, and falls
/// back to `inner` for every other class.
pub struct AttributeObjectBuilderFactory<F> {
    inner: F,
    reflection: Arc<dyn ReflectionSource>,
}

impl<F: ObjectBuilderFactory> AttributeObjectBuilderFactory<F> {
    pub fn new(inner: F, reflection: Arc<dyn ReflectionSource>) -> Self {
        Self { inner, reflection }
    }
}

impl<F: ObjectBuilderFactory> ObjectBuilderFactory for AttributeObjectBuilderFactory<F> {
    fn for_class(
        &self,
        definition: &Arc<ClassDefinition>,
    ) -> Result<Arc<dyn ObjectBuilder>, ObjectBuilderError> {
        let ConstructionStrategy::Factory(method) = definition.strategy() else {
            return self.inner.for_class(definition);
        };

        let factory = definition.factory(method).ok_or_else(|| {
            ObjectBuilderError::ClassNotInstantiable {
                class: definition.name().to_string(),
            }
        })?;

        Ok(Arc::new(ReflectionObjectBuilder::new(
            Callable::factory(definition.name(), method),
            factory.parameters().clone(),
            Arc::clone(&self.reflection),
        )))
    }
}

/// Reuses the builder created for each class signature.
pub struct CacheObjectBuilderFactory<F> {
    inner: F,
    builders: DashMap<String, Arc<dyn ObjectBuilder>>,
}

impl<F: ObjectBuilderFactory> CacheObjectBuilderFactory<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            builders: DashMap::new(),
        }
    }
}

impl<F> fmt::Debug for CacheObjectBuilderFactory<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheObjectBuilderFactory")
            .field("builders", &self.builders.len())
            .finish_non_exhaustive()
    }
}

impl<F: ObjectBuilderFactory> ObjectBuilderFactory for CacheObjectBuilderFactory<F> {
    fn for_class(
        &self,
        definition: &Arc<ClassDefinition>,
    ) -> Result<Arc<dyn ObjectBuilder>, ObjectBuilderError> {
        let signature = definition.class_type().signature();
        if let Some(builder) = self.builders.get(&signature) {
            return Ok(Arc::clone(builder.value()));
        }

        let builder = self.inner.for_class(definition)?;
        debug!(class = signature; "Object builder created");
        self.builders.insert(signature, Arc::clone(&builder));
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use treecast_core::{
        definition::Attribute,
        reflection::Arguments,
        value::Value,
    };

    use super::*;
    use crate::{
        definition::{ClassDefinitionRepository, ReflectionClassDefinitionRepository},
        registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration},
    };

    fn registry() -> Arc<ClassRegistry> {
        Arc::new(
            ClassRegistry::new()
                .with_class(
                    ClassDeclaration::new("Money")
                        .with_parameter(ParameterDeclaration::new("cents", "int"))
                        .with_attribute(Attribute::Factory {
                            method: "of".to_string(),
                        })
                        .with_factory(
                            "of",
                            vec![ParameterDeclaration::new("amount", "float")],
                            |arguments: Arguments| {
                                let Some(Value::Float(amount)) = arguments.get("amount") else {
                                    return Err("amount must be a float".to_string());
                                };
                                Ok(Value::Int((amount * 100.0).round() as i64))
                            },
                        ),
                )
                .with_class(
                    ClassDeclaration::new("Point")
                        .with_parameter(ParameterDeclaration::new("x", "int"))
                        .with_parameter(
                            ParameterDeclaration::new("y", "int").with_default(Value::Int(0)),
                        ),
                )
                .with_class(ClassDeclaration::new("Shape").not_instantiable()),
        )
    }

    fn definition(registry: &Arc<ClassRegistry>, class: &str) -> Arc<ClassDefinition> {
        ReflectionClassDefinitionRepository::new(registry.clone(), registry.clone())
            .for_class(&treecast_core::types::ClassType::new(class))
            .unwrap()
    }

    fn factory(registry: &Arc<ClassRegistry>) -> impl ObjectBuilderFactory {
        AttributeObjectBuilderFactory::new(
            BasicObjectBuilderFactory::new(registry.clone()),
            registry.clone(),
        )
    }

    #[test]
    fn test_constructor_fills_defaults() {
        let registry = registry();
        let builder = factory(&registry)
            .for_class(&definition(&registry, "Point"))
            .unwrap();

        let mut arguments = Arguments::new();
        arguments.insert("x".to_string(), Value::Int(3));
        let point = builder.build(arguments).unwrap();

        let object = point.as_object().unwrap();
        assert_eq!(object.field("x"), Some(&Value::Int(3)));
        assert_eq!(object.field("y"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_missing_required_argument() {
        let registry = registry();
        let builder = factory(&registry)
            .for_class(&definition(&registry, "Point"))
            .unwrap();

        let err = builder.build(Arguments::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments for `Point::new`: missing argument `x`"
        );
    }

    #[test]
    fn test_factory_attribute_replaces_constructor() {
        let registry = registry();
        let builder = factory(&registry)
            .for_class(&definition(&registry, "Money"))
            .unwrap();

        assert_eq!(
            builder.parameters().iter().map(|p| p.name()).collect::<Vec<_>>(),
            ["amount"]
        );

        let mut arguments = Arguments::new();
        arguments.insert("amount".to_string(), Value::Float(12.5));
        assert_eq!(builder.build(arguments).unwrap(), Value::Int(1250));

        let mut arguments = Arguments::new();
        arguments.insert("amount".to_string(), Value::from("12.5"));
        assert!(matches!(
            builder.build(arguments),
            Err(ObjectBuilderError::ConstructionFailed { .. })
        ));
    }

    #[test]
    fn test_non_instantiable_class() {
        let registry = registry();
        let result = factory(&registry).for_class(&definition(&registry, "Shape"));

        assert!(matches!(
            result,
            Err(ObjectBuilderError::ClassNotInstantiable { class }) if class == "Shape"
        ));
    }

    #[test]
    fn test_cache_reuses_builders() {
        let registry = registry();
        let factory = CacheObjectBuilderFactory::new(factory(&registry));
        let definition = definition(&registry, "Point");

        let first = factory.for_class(&definition).unwrap();
        let second = factory.for_class(&definition).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }
}

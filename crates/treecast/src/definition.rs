//! Building [`ClassDefinition`]s by introspection.

use std::{fmt, sync::Arc};

use log::debug;
use treecast_core::{
    definition::{
        Attribute, AttributeKind, ClassDefinition, ConstructionStrategy, FactoryDefinition,
        ParameterDefinition, Parameters,
    },
    reflection::{
        AttributesSource, Callable, DeclarationSite, ReflectionSource, SymbolKind, SymbolSource,
    },
    types::ClassType,
};
use treecast_parser::{TemplateSpecification, TypeParser, TypeParserFactory};

use crate::error::DefinitionError;

/// Provides the definition of a class type.
pub trait ClassDefinitionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns [`DefinitionError::ClassNotFound`] for unknown classes and
    /// [`DefinitionError::InvalidClass`] for classes whose declaration is
    /// inconsistent.
    fn for_class(&self, class: &ClassType) -> Result<Arc<ClassDefinition>, DefinitionError>;
}

/// Introspects classes through a [`ReflectionSource`] and an
/// [`AttributesSource`].
pub struct ReflectionClassDefinitionRepository {
    reflection: Arc<dyn ReflectionSource>,
    attributes: Arc<dyn AttributesSource>,
    parsers: TypeParserFactory,
}

impl ReflectionClassDefinitionRepository {
    pub fn new(reflection: Arc<dyn ReflectionSource>, attributes: Arc<dyn AttributesSource>) -> Self {
        let symbols: Arc<dyn SymbolSource> = reflection.clone();
        Self {
            reflection,
            attributes,
            parsers: TypeParserFactory::new(symbols),
        }
    }

    /// Share a parser factory, and so its parse cache (builder style).
    pub fn with_parsers(mut self, parsers: TypeParserFactory) -> Self {
        self.parsers = parsers;
        self
    }

    fn parameters(
        &self,
        class: &ClassType,
        callable: &Callable,
        parser: &dyn TypeParser,
    ) -> Result<Option<Parameters>, DefinitionError> {
        let Some(reflected) = self.reflection.parameters_of(callable) else {
            return Ok(None);
        };

        let mut parameters = Vec::with_capacity(reflected.len());
        for parameter in reflected {
            let site = DeclarationSite::Parameter {
                callable: callable.clone(),
                parameter: parameter.name().to_string(),
            };
            let ty = parser.parse(parameter.declared_type()).map_err(|err| {
                DefinitionError::invalid(
                    class.name(),
                    format!(
                        "parameter `{site}` has invalid type `{}`: {err}",
                        parameter.declared_type()
                    ),
                )
            })?;

            let mut definition = ParameterDefinition::new(parameter.name(), site.to_string(), ty)
                .with_attributes(self.attributes.attributes_for(&site));
            if let Some(default) = parameter.default_value() {
                definition = definition.with_default(default.clone());
            }
            parameters.push(definition);
        }

        Ok(Some(Parameters::new(parameters)))
    }
}

impl fmt::Debug for ReflectionClassDefinitionRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReflectionClassDefinitionRepository")
            .field("parsers", &self.parsers)
            .finish_non_exhaustive()
    }
}

impl ClassDefinitionRepository for ReflectionClassDefinitionRepository {
    fn for_class(&self, class: &ClassType) -> Result<Arc<ClassDefinition>, DefinitionError> {
        let name = class.name();
        let symbol = self
            .reflection
            .symbol(name)
            .filter(|symbol| symbol.kind() == SymbolKind::Class)
            .ok_or_else(|| DefinitionError::ClassNotFound(name.to_string()))?;

        if let Some(unknown) = class
            .generics()
            .keys()
            .find(|template| !symbol.templates().contains(template))
        {
            return Err(DefinitionError::invalid(
                name,
                format!(
                    "generic `{unknown}` is not a template of the class (declared: [{}])",
                    symbol.templates().join(", ")
                ),
            ));
        }

        let specification = TemplateSpecification::for_class(symbol.templates(), class);
        let parser = self.parsers.get(Arc::new(specification));

        let constructor = Callable::constructor(name);
        let constructor_parameters = self.parameters(class, &constructor, &parser)?;
        let instantiable = constructor_parameters.is_some() && self.reflection.is_instantiable(name);

        let attributes = self
            .attributes
            .attributes_for(&DeclarationSite::Class(name.to_string()));

        let mut definition = ClassDefinition::new(
            class.clone(),
            attributes.clone(),
            constructor_parameters.unwrap_or_default(),
        )
        .with_instantiable(instantiable);

        for attribute in attributes.of_kind(AttributeKind::Factory) {
            let Attribute::Factory { method } = attribute else {
                continue;
            };
            if definition.factory(method).is_some() {
                continue;
            }

            let callable = Callable::factory(name, method);
            let parameters = self.parameters(class, &callable, &parser)?.ok_or_else(|| {
                DefinitionError::invalid(name, format!("factory `{callable}` does not exist"))
            })?;
            definition = definition.with_factory(FactoryDefinition::new(method, parameters));
        }

        if let Some(first) = definition.factories().first() {
            let strategy = ConstructionStrategy::Factory(first.name().to_string());
            definition = definition.with_strategy(strategy);
        }

        debug!(
            class = class.signature(),
            parameters = definition.parameters().len(),
            factories = definition.factories().len();
            "Class definition built"
        );
        Ok(Arc::new(definition))
    }
}

#[cfg(test)]
mod tests {
    use treecast_core::{
        types::{ScalarKind, Type},
        value::Value,
    };

    use super::*;
    use crate::registry::{ClassDeclaration, ClassRegistry, ParameterDeclaration};

    fn repository(registry: ClassRegistry) -> ReflectionClassDefinitionRepository {
        let registry = Arc::new(registry);
        ReflectionClassDefinitionRepository::new(registry.clone(), registry)
    }

    #[test]
    fn test_parameters_are_parsed_in_order() {
        let repository = repository(
            ClassRegistry::new().with_class(
                ClassDeclaration::new("User")
                    .with_parameter(ParameterDeclaration::new("id", "positive-int"))
                    .with_parameter(
                        ParameterDeclaration::new("tags", "list<string>")
                            .with_default(Value::List(Vec::new())),
                    ),
            ),
        );

        let definition = repository.for_class(&ClassType::new("User")).unwrap();
        let parameters: Vec<_> = definition.parameters().iter().collect();

        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].ty(), &Type::Scalar(ScalarKind::PositiveInt));
        assert_eq!(parameters[0].signature(), "User::new($id)");
        assert!(parameters[1].is_optional());
        assert_eq!(definition.strategy(), &ConstructionStrategy::Constructor);
        assert!(definition.is_instantiable());
    }

    #[test]
    fn test_templates_are_bound_from_generics() {
        let repository = repository(
            ClassRegistry::new().with_class(
                ClassDeclaration::new("Page")
                    .with_templates(["T"])
                    .with_parameter(ParameterDeclaration::new("items", "list<T>")),
            ),
        );

        let mut generics = indexmap::IndexMap::new();
        generics.insert("T".to_string(), Type::Scalar(ScalarKind::Int));
        let bound = repository
            .for_class(&ClassType::new("Page").with_generics(generics))
            .unwrap();
        let unbound = repository.for_class(&ClassType::new("Page")).unwrap();

        assert_eq!(
            bound.parameters().get("items").unwrap().ty(),
            &Type::list(Type::Scalar(ScalarKind::Int))
        );
        assert_eq!(
            unbound.parameters().get("items").unwrap().ty(),
            &Type::list(Type::Mixed)
        );
    }

    #[test]
    fn test_unknown_class() {
        let repository = repository(ClassRegistry::new().with_interface("Shape"));

        assert_eq!(
            repository.for_class(&ClassType::new("Missing")).unwrap_err(),
            DefinitionError::ClassNotFound("Missing".to_string())
        );
        assert_eq!(
            repository.for_class(&ClassType::new("Shape")).unwrap_err(),
            DefinitionError::ClassNotFound("Shape".to_string())
        );
    }

    #[test]
    fn test_invalid_parameter_type() {
        let repository = repository(
            ClassRegistry::new().with_class(
                ClassDeclaration::new("Broken")
                    .with_parameter(ParameterDeclaration::new("value", "list<int")),
            ),
        );

        let err = repository.for_class(&ClassType::new("Broken")).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidClass { ref class, .. } if class == "Broken"));
        assert!(err.to_string().contains("Broken::new($value)"));
    }

    #[test]
    fn test_missing_factory() {
        let repository = repository(
            ClassRegistry::new().with_class(ClassDeclaration::new("Money").with_attribute(
                Attribute::Factory {
                    method: "of".to_string(),
                },
            )),
        );

        let err = repository.for_class(&ClassType::new("Money")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid class `Money`: factory `Money::of` does not exist"
        );
    }

    #[test]
    fn test_generic_not_declared_as_template() {
        let repository = repository(ClassRegistry::new().with_class(ClassDeclaration::new("Plain")));

        let mut generics = indexmap::IndexMap::new();
        generics.insert("T".to_string(), Type::Mixed);
        let err = repository
            .for_class(&ClassType::new("Plain").with_generics(generics))
            .unwrap_err();

        assert!(matches!(err, DefinitionError::InvalidClass { .. }));
    }
}

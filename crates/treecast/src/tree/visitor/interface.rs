use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use serde_json::Value as JsonValue;
use treecast_core::types::{ClassType, Type};
use treecast_parser::{BasicSpecification, TypeParser, TypeParserFactory};

use crate::{
    config::InterfaceBinding,
    error::{ErrorKind, MappingError, TreecastError},
    tree::{
        Failure, Shell, TreeBuilder, describe,
        visitor::{ShellVisitor, Visited},
    },
};

/// Rewrites interfaces to the implementation bound to them.
///
/// Interfaces without a binding are passed on unchanged and rejected by the
/// type dispatch.
pub(crate) struct InterfaceShellVisitor {
    bindings: IndexMap<String, InterfaceBinding>,
    parsers: TypeParserFactory,
}

impl InterfaceShellVisitor {
    pub(crate) fn new(bindings: IndexMap<String, InterfaceBinding>, parsers: TypeParserFactory) -> Self {
        Self { bindings, parsers }
    }

    fn parse(&self, description: &str) -> Result<Type, Failure> {
        self.parsers
            .get(Arc::new(BasicSpecification))
            .parse(description)
            .map_err(|err| Failure::fatal(TreecastError::new_type_parsing(err, description)))
    }

    /// The description registered for the value of the discriminator key.
    fn discriminate<'a>(
        interface: &ClassType,
        discriminator: &'a str,
        classes: &'a IndexMap<String, String>,
        shell: &Shell,
    ) -> Result<&'a str, Failure> {
        let Some(JsonValue::Object(entries)) = shell.input() else {
            return Err(Failure::message(
                ErrorKind::InvalidMapping,
                format!("expected a mapping, got {}", describe(shell.input())),
            ));
        };

        let path = shell.path().key(discriminator);
        let located = |kind, message: String| Failure::Located(vec![MappingError::new(path.clone(), kind, message)]);

        let value = match entries.get(discriminator) {
            None => {
                return Err(located(
                    ErrorKind::MissingShapedField,
                    format!("missing discriminator key `{discriminator}`"),
                ));
            }
            Some(JsonValue::String(value)) => value.clone(),
            Some(JsonValue::Number(value)) => value.to_string(),
            Some(other) => {
                return Err(located(
                    ErrorKind::InvalidScalarValue,
                    format!("value {} is not a valid discriminator", describe(Some(other))),
                ));
            }
        };

        classes.get(&value).map(String::as_str).ok_or_else(|| {
            let accepted: Vec<_> = classes.keys().map(|key| format!("'{key}'")).collect();
            located(
                ErrorKind::InterfaceNotRegistered,
                format!(
                    "no implementation of `{}` is registered for '{value}', expected one of {}",
                    interface.name(),
                    accepted.join(", ")
                ),
            )
        })
    }
}

impl ShellVisitor for InterfaceShellVisitor {
    fn visit(&self, shell: Shell, _: &TreeBuilder) -> Result<Visited, Failure> {
        let Type::Interface(interface) = shell.ty() else {
            return Ok(Visited::Continue(shell));
        };
        let Some(binding) = self.bindings.get(interface.name()) else {
            return Ok(Visited::Continue(shell));
        };

        let (ty, shell) = match binding {
            InterfaceBinding::Fixed { description } => (self.parse(description)?, shell),
            InterfaceBinding::Discriminated {
                discriminator,
                classes,
            } => {
                let description = Self::discriminate(interface, discriminator, classes, &shell)?;
                (self.parse(description)?, shell.without_key(discriminator))
            }
        };

        debug!(path:% = shell.path(), ty:% = ty; "Bound interface");
        Ok(match ty {
            Type::Union(_) => Visited::Restart(shell.with_type(ty)),
            _ => Visited::Continue(shell.with_type(ty)),
        })
    }
}

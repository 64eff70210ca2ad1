use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use treecast_core::definition::{Attribute, AttributeKind, Attributes};
use treecast_parser::{BasicSpecification, TypeParser, TypeParserFactory};

use crate::{
    error::{ErrorKind, TreecastError},
    hooks::Transformer,
    tree::{
        Failure, Shell, TreeBuilder,
        visitor::{ShellVisitor, Visited},
    },
};

/// Applies `Type` and `Transform` attributes of the declaration site.
///
/// Consumed attributes are removed from the shell. When a `Type` attribute
/// replaced the type, the visitor chain restarts so that a forced union or
/// interface is narrowed too.
pub(crate) struct AttributeShellVisitor {
    parsers: TypeParserFactory,
    transformers: IndexMap<String, Transformer>,
}

impl AttributeShellVisitor {
    pub(crate) fn new(parsers: TypeParserFactory, transformers: IndexMap<String, Transformer>) -> Self {
        Self {
            parsers,
            transformers,
        }
    }
}

impl ShellVisitor for AttributeShellVisitor {
    fn visit(&self, shell: Shell, _: &TreeBuilder) -> Result<Visited, Failure> {
        let attributes = shell.attributes();
        if !attributes.has(AttributeKind::Type) && !attributes.has(AttributeKind::Transform) {
            return Ok(Visited::Continue(shell));
        }

        let forced = match attributes.of_kind(AttributeKind::Type).last() {
            Some(Attribute::Type { description }) => Some(
                self.parsers
                    .get(Arc::new(BasicSpecification))
                    .parse(description)
                    .map_err(|err| Failure::fatal(TreecastError::new_type_parsing(err, description.as_str())))?,
            ),
            _ => None,
        };

        let mut input = shell.input().cloned();
        for attribute in attributes.of_kind(AttributeKind::Transform) {
            let Attribute::Transform { name } = attribute else {
                continue;
            };
            let Some(transformer) = self.transformers.get(name) else {
                return Err(Failure::fatal(TreecastError::Config(format!(
                    "transformer `{name}` is not registered"
                ))));
            };
            if let Some(value) = input.take() {
                debug!(path:% = shell.path(), transformer = name.as_str(); "Transforming input");
                input = Some(transformer(value).map_err(|err| {
                    Failure::message(
                        ErrorKind::TransformFailed,
                        format!("transformer `{name}` failed: {err}"),
                    )
                })?);
            }
        }

        let remaining: Attributes = attributes
            .iter()
            .filter(|attribute| !matches!(attribute.kind(), AttributeKind::Type | AttributeKind::Transform))
            .cloned()
            .collect();
        let shell = shell.with_input(input).with_attributes(remaining);

        Ok(match forced {
            Some(ty) if ty != *shell.ty() => Visited::Restart(shell.with_type(ty)),
            _ => Visited::Continue(shell),
        })
    }
}

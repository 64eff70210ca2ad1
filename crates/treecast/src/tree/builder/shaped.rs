use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use treecast_core::{
    types::ShapedArrayType,
    value::{MapKey, Value},
};

use crate::{
    error::{ErrorKind, MappingError},
    tree::{Children, Failure, Path, Shell, TreeBuilder, describe},
};

/// `array{...}` nodes.
pub(crate) struct ShapedArrayNodeBuilder {
    allow_superfluous_keys: bool,
}

impl ShapedArrayNodeBuilder {
    pub(crate) fn new(allow_superfluous_keys: bool) -> Self {
        Self {
            allow_superfluous_keys,
        }
    }

    pub(super) fn build(
        &self,
        shape: &ShapedArrayType,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Value, Failure> {
        let mut entries: IndexMap<MapKey, (Path, &JsonValue)> = match shell.input() {
            Some(JsonValue::Object(entries)) => entries
                .iter()
                .map(|(key, value)| (MapKey::from_input(key), (shell.path().key(key), value)))
                .collect(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    let key = MapKey::Int(i64::try_from(index).unwrap_or(i64::MAX));
                    (key, (shell.path().index(index), value))
                })
                .collect(),
            other => {
                return Err(Failure::message(
                    ErrorKind::InvalidMapping,
                    format!("expected a mapping, got {}", describe(other)),
                ));
            }
        };

        let mut children = Children::default();
        let mut values = IndexMap::with_capacity(shape.elements().len());
        for element in shape.elements() {
            let lookup = MapKey::from_input(&element.key().to_string());
            match entries.shift_remove(&lookup) {
                Some((path, item)) => {
                    let child = shell.child(path.clone(), element.ty().clone(), Some(item.clone()));
                    if let Some(value) = children.record(&path, tree.build(child))? {
                        values.insert(element.key().clone(), value);
                    }
                }
                None if element.is_optional() => {}
                None => children.push(MappingError::new(
                    shell.path().key(element.key().to_string()),
                    ErrorKind::MissingShapedField,
                    format!("missing required key `{}`", element.key()),
                )),
            }
        }

        for (key, (path, item)) in entries {
            if !shape.is_sealed() {
                values.insert(key, Value::from_json(item));
            } else if !self.allow_superfluous_keys {
                children.push(MappingError::new(
                    path,
                    ErrorKind::UnexpectedKey,
                    format!("unexpected key `{key}`"),
                ));
            }
        }
        children.finish()?;

        Ok(Value::Map(values))
    }
}

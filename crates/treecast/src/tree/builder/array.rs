use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use treecast_core::{
    types::{ArrayKeyType, ArrayType},
    value::{MapKey, Value},
};

use crate::{
    error::{ErrorKind, MappingError},
    tree::{Children, Failure, Path, Shell, TreeBuilder, describe},
};

/// `array<K, V>`, `non-empty-array<K, V>` and `iterable<K, V>` nodes.
///
/// Accepts mappings and sequences; sequence entries are keyed by index.
pub(crate) struct ArrayNodeBuilder;

impl ArrayNodeBuilder {
    pub(super) fn build(
        &self,
        array: &ArrayType,
        non_empty: bool,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Value, Failure> {
        let entries: Vec<(Entry, &JsonValue)> = match shell.input() {
            Some(JsonValue::Object(entries)) => entries
                .iter()
                .map(|(key, value)| (Entry::Key(key), value))
                .collect(),
            Some(JsonValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (Entry::Index(index), value))
                .collect(),
            other => {
                return Err(Failure::message(
                    ErrorKind::InvalidMapping,
                    format!("expected a mapping or a sequence, got {}", describe(other)),
                ));
            }
        };

        if non_empty && entries.is_empty() {
            return Err(Failure::message(
                ErrorKind::EmptySequence,
                "array must not be empty",
            ));
        }

        let mut children = Children::default();
        let mut values = IndexMap::with_capacity(entries.len());
        for (entry, item) in entries {
            let path = entry.path(shell.path());
            let Some(key) = entry.key(array.key()) else {
                children.push(MappingError::new(
                    path,
                    ErrorKind::InvalidKey,
                    format!("key {entry} is not a valid {}", array.key()),
                ));
                continue;
            };

            let child = shell.child(path.clone(), array.value().clone(), Some(item.clone()));
            if let Some(value) = children.record(&path, tree.build(child))? {
                values.insert(key, value);
            }
        }
        children.finish()?;

        Ok(Value::Map(values))
    }
}

#[derive(Debug, Clone, Copy)]
enum Entry<'a> {
    Key(&'a str),
    Index(usize),
}

impl Entry<'_> {
    fn path(self, parent: &Path) -> Path {
        match self {
            Entry::Key(key) => parent.key(key),
            Entry::Index(index) => parent.index(index),
        }
    }

    /// The map key of this entry if it is valid for `key_type`.
    fn key(self, key_type: ArrayKeyType) -> Option<MapKey> {
        match (self, key_type) {
            (Entry::Index(index), ArrayKeyType::Int | ArrayKeyType::ArrayKey) => {
                i64::try_from(index).ok().map(MapKey::Int)
            }
            (Entry::Index(_), ArrayKeyType::String) => None,
            (Entry::Key(key), ArrayKeyType::String) => Some(MapKey::String(key.to_string())),
            (Entry::Key(key), ArrayKeyType::ArrayKey) => Some(MapKey::from_input(key)),
            (Entry::Key(key), ArrayKeyType::Int) => match MapKey::from_input(key) {
                MapKey::Int(index) => Some(MapKey::Int(index)),
                MapKey::String(_) => None,
            },
        }
    }
}

impl std::fmt::Display for Entry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Key(key) => write!(f, "'{key}'"),
            Entry::Index(index) => write!(f, "{index}"),
        }
    }
}

use serde_json::Value as JsonValue;
use treecast_core::{types::Type, value::Value};

use crate::{
    error::ErrorKind,
    tree::{Children, Failure, Shell, TreeBuilder, describe},
};

/// `list<T>` and `non-empty-list<T>` nodes.
pub(crate) struct ListNodeBuilder;

impl ListNodeBuilder {
    pub(super) fn build(
        &self,
        value_type: &Type,
        non_empty: bool,
        shell: &Shell,
        tree: &TreeBuilder,
    ) -> Result<Value, Failure> {
        let Some(JsonValue::Array(items)) = shell.input() else {
            return Err(Failure::message(
                ErrorKind::InvalidSequence,
                format!("expected a sequence, got {}", describe(shell.input())),
            ));
        };

        if non_empty && items.is_empty() {
            return Err(Failure::message(
                ErrorKind::EmptySequence,
                "sequence must not be empty",
            ));
        }

        let mut children = Children::default();
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = shell.path().index(index);
            let child = shell.child(path.clone(), value_type.clone(), Some(item.clone()));
            if let Some(value) = children.record(&path, tree.build(child))? {
                values.push(value);
            }
        }
        children.finish()?;

        Ok(Value::List(values))
    }
}

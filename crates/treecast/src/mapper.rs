//! The mapping entry point.

use std::fmt;

use log::{debug, info};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use treecast_core::value::Value;
use treecast_parser::{CachedParser, LexingTypeParser, TypeParser};

use crate::{
    error::TreecastError,
    tree::{Shell, TreeBuilder},
};

/// Maps raw input onto types described by type descriptions.
///
/// Created by [`MapperBuilder`](crate::MapperBuilder). A mapper is `Send`
/// and `Sync`, and is meant to be created once and shared: parsed types,
/// class definitions and object builders are cached across calls.
pub struct TreeMapper {
    parser: CachedParser<LexingTypeParser>,
    tree: TreeBuilder,
}

impl TreeMapper {
    pub(crate) fn new(parser: CachedParser<LexingTypeParser>, tree: TreeBuilder) -> Self {
        Self { parser, tree }
    }

    /// Map `input` onto the type described by `description`.
    ///
    /// # Errors
    ///
    /// Returns [`TreecastError::TypeParsing`] if the description is invalid,
    /// [`TreecastError::Mapping`] with every error found if the input does
    /// not match, and [`TreecastError::Definition`] or
    /// [`TreecastError::TypeGraphTooDeep`] if a class cannot be mapped at all.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::sync::Arc;
    /// # use serde_json::json;
    /// # use treecast::{MapperBuilder, registry::ClassRegistry, value::Value};
    /// let mapper = MapperBuilder::new(Arc::new(ClassRegistry::new())).build()?;
    ///
    /// let ids = mapper.map("list<positive-int>", json!(["4", 8]))?;
    /// assert_eq!(ids, Value::List(vec![Value::Int(4), Value::Int(8)]));
    ///
    /// let err = mapper.map("list<positive-int>", json!([0, "x"])).unwrap_err();
    /// assert_eq!(err.mapping_errors().map(|errors| errors.len()), Some(2));
    /// # Ok::<(), treecast::TreecastError>(())
    /// ```
    pub fn map(&self, description: &str, input: JsonValue) -> Result<Value, TreecastError> {
        info!(ty = description; "Mapping input");

        let ty = self
            .parser
            .parse(description)
            .map_err(|err| TreecastError::new_type_parsing(err, description))?;
        let shell = Shell::root(ty, input);
        let root = shell.path().clone();

        match self.tree.build(shell) {
            Ok(value) => {
                info!(ty = description; "Input mapped");
                Ok(value)
            }
            Err(failure) => {
                let err = failure.into_error(&root);
                debug!(ty = description, err:% = err; "Mapping failed");
                Err(err)
            }
        }
    }

    /// Map `input` like [`map`](Self::map), then deserialize the result into
    /// `T`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`map`](Self::map), and
    /// [`TreecastError::Deserialize`] if the mapped value does not fit `T`.
    pub fn map_into<T: DeserializeOwned>(
        &self,
        description: &str,
        input: JsonValue,
    ) -> Result<T, TreecastError> {
        let value = self.map(description, input)?;
        Ok(serde_json::from_value(value.to_json())?)
    }
}

impl fmt::Debug for TreeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeMapper")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

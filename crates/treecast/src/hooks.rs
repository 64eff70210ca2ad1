//! Runtime hooks registered on a [`MapperBuilder`](crate::MapperBuilder).

use std::sync::Arc;

use serde_json::Value as JsonValue;
use treecast_core::value::Value;

use crate::tree::Shell;

/// Builds an instance of a class directly from its raw input, bypassing
/// parameter mapping.
pub type ObjectBinder = Arc<dyn Fn(&JsonValue) -> Result<Value, String> + Send + Sync>;

/// Rewrites the raw input of nodes requested as a given type, before they
/// are mapped.
pub type ValueAlterer = Arc<dyn Fn(JsonValue) -> JsonValue + Send + Sync>;

/// Observes every successfully built node.
pub type NodeObserver = Arc<dyn Fn(&Shell, &Value) + Send + Sync>;

/// Pre-transforms raw input before it is mapped. Referenced by name from
/// `Transform` attributes.
pub type Transformer = Arc<dyn Fn(JsonValue) -> Result<JsonValue, String> + Send + Sync>;

//! The recursive mapping engine.
//!
//! A [`Shell`] is created for the root of the input and pushed through the
//! node builder pipeline. Composite builders create one shell per child and
//! push each of them through the same pipeline again.

mod builder;
mod path;
mod shell;
mod visitor;

use serde_json::Value as JsonValue;
use treecast_core::value::Value;

use crate::error::{ErrorKind, MappingError, MappingErrors, TreecastError};

pub use path::{Path, Segment};
pub use shell::Shell;

pub(crate) use builder::{
    CasterNodeBuilder, ClassNodeBuilder, EnumNodeBuilder, ErrorCatcherNodeBuilder, NodeMiddleware,
    ScalarNodeBuilder, ShapedArrayNodeBuilder, ShellVisitorNodeBuilder, TreeBuilder,
    ValueAlteringNodeBuilder, VisitorNodeBuilder,
};
pub(crate) use visitor::{
    AggregateShellVisitor, AttributeShellVisitor, InterfaceShellVisitor,
    ObjectBindingShellVisitor, UnionShellVisitor,
};

/// Why a node could not be built.
#[derive(Debug)]
pub(crate) enum Failure {
    /// Not yet located: recorded at the path of the node that raised it.
    Message(ErrorKind, String),
    /// Errors already tagged with their paths.
    Located(Vec<MappingError>),
    /// Aborts the whole mapping call.
    Fatal(Box<TreecastError>),
}

impl Failure {
    pub(crate) fn message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Failure::Message(kind, message.into())
    }

    pub(crate) fn fatal(err: impl Into<TreecastError>) -> Self {
        Failure::Fatal(Box::new(err.into()))
    }

    /// Tag a pending message with `path`.
    pub(crate) fn located(self, path: &Path) -> Self {
        match self {
            Failure::Message(kind, message) => {
                Failure::Located(vec![MappingError::new(path.clone(), kind, message)])
            }
            other => other,
        }
    }

    /// The errors of a failed node at `path`; fatal failures are passed on.
    pub(crate) fn into_errors(self, path: &Path) -> Result<Vec<MappingError>, Failure> {
        match self.located(path) {
            Failure::Located(errors) => Ok(errors),
            other => Err(other),
        }
    }

    /// The error returned to the caller for a root node at `path`.
    pub(crate) fn into_error(self, path: &Path) -> TreecastError {
        match self.located(path) {
            Failure::Located(errors) => match MappingErrors::new(errors) {
                Some(errors) => TreecastError::Mapping(errors),
                None => TreecastError::Config("mapping failed without an error".to_string()),
            },
            Failure::Fatal(err) => *err,
            Failure::Message(..) => TreecastError::Config("unlocated mapping error".to_string()),
        }
    }

    /// One-line description, used when reporting failed union members.
    pub(crate) fn summary(&self) -> String {
        match self {
            Failure::Message(_, message) => message.clone(),
            Failure::Located(errors) => match errors.as_slice() {
                [] => "failed".to_string(),
                [only] => only.to_string(),
                [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
            },
            Failure::Fatal(err) => err.to_string(),
        }
    }
}

impl From<TreecastError> for Failure {
    fn from(err: TreecastError) -> Self {
        Failure::fatal(err)
    }
}

/// Collects the failures of the children of a composite node, so that every
/// failing child is reported rather than only the first.
#[derive(Debug, Default)]
pub(crate) struct Children {
    errors: Vec<MappingError>,
}

impl Children {
    /// Record the result of building the child at `path`.
    ///
    /// Returns the value on success and `None` on a node failure. Fatal
    /// failures are returned as errors.
    pub(crate) fn record(
        &mut self,
        path: &Path,
        result: Result<Value, Failure>,
    ) -> Result<Option<Value>, Failure> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(failure) => {
                self.errors.extend(failure.into_errors(path)?);
                Ok(None)
            }
        }
    }

    pub(crate) fn push(&mut self, error: MappingError) {
        self.errors.push(error);
    }

    /// Fails with every recorded error, if any.
    pub(crate) fn finish(self) -> Result<(), Failure> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Failure::Located(self.errors))
        }
    }
}

/// Short human readable summary of an input value for error messages.
pub(crate) fn describe(input: Option<&JsonValue>) -> String {
    const MAX_CHARS: usize = 40;

    match input {
        None => "nothing".to_string(),
        Some(JsonValue::Null) => "null".to_string(),
        Some(JsonValue::Bool(value)) => value.to_string(),
        Some(JsonValue::Number(number)) => number.to_string(),
        Some(JsonValue::String(value)) if value.chars().count() > MAX_CHARS => {
            let truncated: String = value.chars().take(MAX_CHARS).collect();
            format!("'{truncated}...'")
        }
        Some(JsonValue::String(value)) => format!("'{value}'"),
        Some(JsonValue::Array(items)) => format!("a sequence of {} elements", items.len()),
        Some(JsonValue::Object(entries)) => format!("a mapping of {} entries", entries.len()),
    }
}

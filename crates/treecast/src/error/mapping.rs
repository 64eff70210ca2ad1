//! Path-tagged errors raised while mapping single nodes.

use std::{fmt, slice, vec};

use crate::tree::Path;

/// What went wrong at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidScalarValue,
    EmptySequence,
    MissingShapedField,
    UnexpectedKey,
    InvalidEnumValue,
    UnionResolutionError,
    InterfaceNotRegistered,
    InvalidConstructorArguments,
    ClassNotInstantiable,
    MissingValue,
    InvalidSequence,
    InvalidMapping,
    InvalidKey,
    ConstructionFailed,
    TransformFailed,
}

impl ErrorKind {
    /// Stable identifier of the kind, e.g. `invalid_scalar_value`.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidScalarValue => "invalid_scalar_value",
            ErrorKind::EmptySequence => "empty_sequence",
            ErrorKind::MissingShapedField => "missing_shaped_field",
            ErrorKind::UnexpectedKey => "unexpected_key",
            ErrorKind::InvalidEnumValue => "invalid_enum_value",
            ErrorKind::UnionResolutionError => "union_resolution_error",
            ErrorKind::InterfaceNotRegistered => "interface_not_registered",
            ErrorKind::InvalidConstructorArguments => "invalid_constructor_arguments",
            ErrorKind::ClassNotInstantiable => "class_not_instantiable",
            ErrorKind::MissingValue => "missing_value",
            ErrorKind::InvalidSequence => "invalid_sequence",
            ErrorKind::InvalidMapping => "invalid_mapping",
            ErrorKind::InvalidKey => "invalid_key",
            ErrorKind::ConstructionFailed => "construction_failed",
            ErrorKind::TransformFailed => "transform_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A failure located at one node of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingError {
    path: Path,
    kind: ErrorKind,
    message: String,
}

impl MappingError {
    pub fn new(path: Path, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every failure of a mapping call, in input order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingErrors(Vec<MappingError>);

impl MappingErrors {
    /// Returns `None` for an empty list.
    pub fn new(errors: Vec<MappingError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, MappingError> {
        self.0.iter()
    }

    /// The first error at `path`, if any.
    pub fn at(&self, path: &str) -> Option<&MappingError> {
        self.0.iter().find(|error| error.path.to_string() == path)
    }
}

impl fmt::Display for MappingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not map input: ")?;
        if let Some(first) = self.0.first() {
            write!(f, "{first}")?;
        }
        if self.0.len() > 1 {
            write!(f, " (+{} more)", self.0.len() - 1)?;
        }
        Ok(())
    }
}

impl IntoIterator for MappingErrors {
    type Item = MappingError;
    type IntoIter = vec::IntoIter<MappingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MappingErrors {
    type Item = &'a MappingError;
    type IntoIter = slice::Iter<'a, MappingError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

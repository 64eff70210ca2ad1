//! Error types for Treecast operations.
//!
//! [`TreecastError`] is returned by every fallible entry point. Errors that
//! concern a single node of the input are collected as [`MappingError`]s in
//! the [`TreecastError::Mapping`] variant; the other variants abort the whole
//! call.

mod mapping;

use std::io;

use thiserror::Error;

use treecast_parser::error::ParseError;

use crate::tree::Path;

pub use mapping::{ErrorKind, MappingError, MappingErrors};

/// The main error type for Treecast operations.
///
/// # Diagnostic Variants
///
/// The `TypeParsing` variant carries the type description it failed on, so
/// the span labels of its diagnostics can be rendered against it.
#[derive(Debug, Error)]
pub enum TreecastError {
    #[error("{err}")]
    TypeParsing { err: ParseError, src: String },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("type graph too deep at `{path}`: more than {depth} nested nodes")]
    TypeGraphTooDeep { path: Path, depth: usize },

    #[error("{0}")]
    Mapping(MappingErrors),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not deserialize the mapped value: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TreecastError {
    /// Create a new `TypeParsing` error with the associated type description.
    pub fn new_type_parsing(err: ParseError, src: impl Into<String>) -> Self {
        Self::TypeParsing {
            err,
            src: src.into(),
        }
    }

    /// The mapping errors, when this is a `Mapping` error.
    pub fn mapping_errors(&self) -> Option<&MappingErrors> {
        match self {
            Self::Mapping(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Failure to build the definition of a class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("class `{0}` not found")]
    ClassNotFound(String),

    #[error("invalid class `{class}`: {reason}")]
    InvalidClass { class: String, reason: String },
}

impl DefinitionError {
    pub(crate) fn invalid(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidClass {
            class: class.into(),
            reason: reason.into(),
        }
    }
}

//! Construction of class instances from mapped arguments.
//!
//! An [`ObjectBuilderFactory`] turns a
//! [`ClassDefinition`](treecast_core::definition::ClassDefinition) into an
//! [`ObjectBuilder`]: the parameters that must be mapped from the input, and
//! the callable that builds the instance from them.

mod builder;
mod factory;

use thiserror::Error;

use crate::error::ErrorKind;

pub use builder::{ObjectBuilder, ReflectionObjectBuilder};
pub use factory::{
    AttributeObjectBuilderFactory, BasicObjectBuilderFactory, CacheObjectBuilderFactory,
    ObjectBuilderFactory,
};

/// Failure to create a builder or to build an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectBuilderError {
    #[error("class `{class}` cannot be instantiated")]
    ClassNotInstantiable { class: String },

    #[error("invalid arguments for `{callable}`: {reason}")]
    InvalidConstructorArguments { callable: String, reason: String },

    #[error("could not build `{callable}`: {reason}")]
    ConstructionFailed { callable: String, reason: String },
}

impl ObjectBuilderError {
    /// The mapping error kind this failure is reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClassNotInstantiable { .. } => ErrorKind::ClassNotInstantiable,
            Self::InvalidConstructorArguments { .. } => ErrorKind::InvalidConstructorArguments,
            Self::ConstructionFailed { .. } => ErrorKind::ConstructionFailed,
        }
    }
}

//! Structural definitions of constructible classes.
//!
//! A [`ClassDefinition`] describes how a class is built: its constructor
//! [`Parameters`], the [`Attributes`] attached to it, the factories declared
//! through attributes, and the [`ConstructionStrategy`] those attributes
//! select. Definitions are produced once per class and generic binding and
//! shared immutably afterwards.

mod attributes;
mod class;
mod parameters;

pub use attributes::{Attribute, AttributeKind, Attributes};
pub use class::{ClassDefinition, ConstructionStrategy, FactoryDefinition};
pub use parameters::{ParameterDefinition, ParameterNotFound, Parameters};

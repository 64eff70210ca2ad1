//! Treecast Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Treecast
//! parser and mapping engine. It includes:
//!
//! - **Types**: The resolved type AST ([`types::Type`])
//! - **Values**: Constructed object graphs ([`value::Value`])
//! - **Definitions**: Class, parameter and attribute definitions ([`definition`] module)
//! - **Reflection**: Collaborator traits for introspection ([`reflection`] module)

pub mod definition;
pub mod reflection;
pub mod types;
pub mod value;

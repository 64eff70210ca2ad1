//! The node builder pipeline.
//!
//! Every node goes through the same stages, outermost first:
//!
//! 1. [`ValueAlteringNodeBuilder`] - rewrites the raw input with value alterers
//! 2. [`VisitorNodeBuilder`] - notifies node observers
//! 3. [`ShellVisitorNodeBuilder`] - narrows unions, binds interfaces, applies
//!    attributes and object binders
//! 4. [`ErrorCatcherNodeBuilder`] - tags pending errors with the node path
//!
//! and finally reaches the [`CasterNodeBuilder`], which dispatches on the
//! category of the target type.

mod array;
mod class;
mod enumeration;
mod list;
mod middleware;
mod scalar;
mod shaped;

use log::trace;
use treecast_core::{types::Type, value::Value};

use crate::{
    error::{ErrorKind, TreecastError},
    tree::{Failure, Shell},
};

pub(crate) use array::ArrayNodeBuilder;
pub(crate) use class::ClassNodeBuilder;
pub(crate) use enumeration::{EnumNodeBuilder, matching_case};
pub(crate) use list::ListNodeBuilder;
pub(crate) use middleware::{
    ErrorCatcherNodeBuilder, ShellVisitorNodeBuilder, ValueAlteringNodeBuilder, VisitorNodeBuilder,
};
pub(crate) use scalar::{ScalarNodeBuilder, coerce};
pub(crate) use shaped::ShapedArrayNodeBuilder;

/// A stage of the pipeline. Calls `next` to continue with the inner stages.
pub(crate) trait NodeMiddleware: Send + Sync {
    fn build(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure>;
}

/// The stages that remain after the current one.
#[derive(Clone, Copy)]
pub(crate) struct Next<'a> {
    tree: &'a TreeBuilder,
    stages: &'a [Box<dyn NodeMiddleware>],
}

impl<'a> Next<'a> {
    /// Run the remaining stages, then the type dispatch.
    pub(crate) fn run(self, shell: Shell) -> Result<Value, Failure> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.build(
                shell,
                Next {
                    tree: self.tree,
                    stages: rest,
                },
            ),
            None => self.tree.caster.build(&shell, self.tree),
        }
    }

    pub(crate) fn tree(&self) -> &'a TreeBuilder {
        self.tree
    }
}

/// The assembled pipeline.
pub(crate) struct TreeBuilder {
    stages: Vec<Box<dyn NodeMiddleware>>,
    caster: CasterNodeBuilder,
    max_depth: usize,
}

impl TreeBuilder {
    pub(crate) fn new(
        stages: Vec<Box<dyn NodeMiddleware>>,
        caster: CasterNodeBuilder,
        max_depth: usize,
    ) -> Self {
        Self {
            stages,
            caster,
            max_depth,
        }
    }

    /// Map one node.
    pub(crate) fn build(&self, shell: Shell) -> Result<Value, Failure> {
        if shell.depth() > self.max_depth {
            return Err(Failure::fatal(TreecastError::TypeGraphTooDeep {
                path: shell.path().clone(),
                depth: self.max_depth,
            }));
        }

        trace!(path:% = shell.path(), ty:% = shell.ty(); "Building node");
        Next {
            tree: self,
            stages: &self.stages,
        }
        .run(shell)
    }
}

/// Dispatches a narrowed node to the builder of its type category.
pub(crate) struct CasterNodeBuilder {
    scalar: ScalarNodeBuilder,
    list: ListNodeBuilder,
    array: ArrayNodeBuilder,
    shaped: ShapedArrayNodeBuilder,
    enumeration: EnumNodeBuilder,
    class: ClassNodeBuilder,
}

impl CasterNodeBuilder {
    pub(crate) fn new(
        scalar: ScalarNodeBuilder,
        shaped: ShapedArrayNodeBuilder,
        enumeration: EnumNodeBuilder,
        class: ClassNodeBuilder,
    ) -> Self {
        Self {
            scalar,
            list: ListNodeBuilder,
            array: ArrayNodeBuilder,
            shaped,
            enumeration,
            class,
        }
    }

    fn build(&self, shell: &Shell, tree: &TreeBuilder) -> Result<Value, Failure> {
        if shell.input().is_none() && !shell.ty().accepts_null() {
            return Err(Failure::message(ErrorKind::MissingValue, "value is missing"));
        }

        match shell.ty() {
            Type::Null => ScalarNodeBuilder::build_null(shell),
            Type::Mixed => Ok(ScalarNodeBuilder::build_mixed(shell)),
            Type::Scalar(kind) => self.scalar.build(kind, shell),
            Type::List(value) => self.list.build(value, false, shell, tree),
            Type::NonEmptyList(value) => self.list.build(value, true, shell, tree),
            Type::Array(array) => self.array.build(array, false, shell, tree),
            Type::NonEmptyArray(array) => self.array.build(array, true, shell, tree),
            Type::Iterable(array) => self.array.build(array, false, shell, tree),
            Type::ShapedArray(shape) => self.shaped.build(shape, shell, tree),
            Type::Enum(enumeration) => self.enumeration.build(enumeration, shell),
            Type::Class(class) => self.class.build(class, shell, tree),
            Type::Interface(interface) => Err(Failure::message(
                ErrorKind::InterfaceNotRegistered,
                format!(
                    "no implementation is registered for interface `{}`",
                    interface.name()
                ),
            )),
            Type::Union(_) => Err(Failure::message(
                ErrorKind::UnionResolutionError,
                format!("could not resolve `{}`", shell.ty()),
            )),
        }
    }
}

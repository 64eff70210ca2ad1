//! Shell visitors rewrite a node before it reaches the type dispatch.
//!
//! They run in a fixed order: union narrowing, interface binding, attribute
//! rewriting and object binding. A visitor may hand the shell on, restart
//! the chain with a rewritten shell, or settle the node with a value.

mod attribute;
mod binding;
mod interface;
mod union;

use treecast_core::value::Value;

use crate::tree::{Failure, Shell, TreeBuilder};

pub(crate) use attribute::AttributeShellVisitor;
pub(crate) use binding::ObjectBindingShellVisitor;
pub(crate) use interface::InterfaceShellVisitor;
pub(crate) use union::UnionShellVisitor;

/// What a visitor did with a shell.
pub(crate) enum Visited {
    /// Go on with the next visitor.
    Continue(Shell),
    /// The type changed in a way earlier visitors must see; start over.
    Restart(Shell),
    /// The node is built.
    Done(Value),
}

pub(crate) trait ShellVisitor: Send + Sync {
    fn visit(&self, shell: Shell, tree: &TreeBuilder) -> Result<Visited, Failure>;
}

/// Runs visitors in order until one settles the node or all have passed.
pub(crate) struct AggregateShellVisitor {
    visitors: Vec<Box<dyn ShellVisitor>>,
}

impl AggregateShellVisitor {
    pub(crate) fn new(visitors: Vec<Box<dyn ShellVisitor>>) -> Self {
        Self { visitors }
    }

    /// Returns [`Visited::Done`] or [`Visited::Continue`] with the final
    /// shell, never [`Visited::Restart`].
    pub(crate) fn visit(&self, mut shell: Shell, tree: &TreeBuilder) -> Result<Visited, Failure> {
        let mut index = 0;
        while let Some(visitor) = self.visitors.get(index) {
            match visitor.visit(shell, tree)? {
                Visited::Continue(next) => {
                    shell = next;
                    index += 1;
                }
                Visited::Restart(next) => {
                    shell = next;
                    index = 0;
                }
                Visited::Done(value) => return Ok(Visited::Done(value)),
            }
        }
        Ok(Visited::Continue(shell))
    }
}

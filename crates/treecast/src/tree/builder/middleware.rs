use log::trace;
use treecast_core::{types::Type, value::Value};

use crate::{
    hooks::{NodeObserver, ValueAlterer},
    tree::{
        AggregateShellVisitor, Failure, Shell,
        builder::{NodeMiddleware, Next},
        shell::Observations,
        visitor::Visited,
    },
};

/// Rewrites the raw input with the alterers registered for the type a node
/// is requested as, before any other stage sees it.
pub(crate) struct ValueAlteringNodeBuilder {
    alterers: Vec<(Type, ValueAlterer)>,
}

impl ValueAlteringNodeBuilder {
    pub(crate) fn new(alterers: Vec<(Type, ValueAlterer)>) -> Self {
        Self { alterers }
    }
}

impl NodeMiddleware for ValueAlteringNodeBuilder {
    fn build(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure> {
        let mut matching = self
            .alterers
            .iter()
            .filter(|(target, _)| target == shell.ty())
            .peekable();
        if matching.peek().is_none() || shell.input().is_none() {
            return next.run(shell);
        }

        let input = shell
            .input()
            .cloned()
            .map(|input| matching.fold(input, |input, (_, alter)| alter(input)));
        trace!(path:% = shell.path(), ty:% = shell.ty(); "Altered input");
        next.run(shell.with_input(input))
    }
}

/// Notifies node observers of every node built successfully.
///
/// Nodes built while a union member is attempted are held back until the
/// attempt succeeds. The attempt node itself is not reported: its union node
/// is, with the same value.
pub(crate) struct VisitorNodeBuilder {
    observers: Vec<NodeObserver>,
}

impl VisitorNodeBuilder {
    pub(crate) fn new(observers: Vec<NodeObserver>) -> Self {
        Self { observers }
    }

    fn notify(&self, shell: &Shell, value: &Value) {
        for observer in &self.observers {
            observer(shell, value);
        }
    }

    fn attempt(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure> {
        let outer = shell.observations().cloned();
        let held = Observations::default();
        let value = next.run(shell.with_observations(held.clone()))?;

        let observed = held.take();
        match outer {
            Some(outer) => outer.extend(observed),
            None => {
                for (shell, value) in &observed {
                    self.notify(shell, value);
                }
            }
        }
        Ok(value)
    }
}

impl NodeMiddleware for VisitorNodeBuilder {
    fn build(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure> {
        if self.observers.is_empty() {
            return next.run(shell);
        }
        if shell.is_attempt() {
            return self.attempt(shell, next);
        }

        let observed = shell.clone();
        let value = next.run(shell)?;
        match observed.observations() {
            Some(held) => held.push(observed.clone(), value.clone()),
            None => self.notify(&observed, &value),
        }
        Ok(value)
    }
}

/// Runs the shell visitors, which may settle the node on their own.
pub(crate) struct ShellVisitorNodeBuilder {
    visitor: AggregateShellVisitor,
}

impl ShellVisitorNodeBuilder {
    pub(crate) fn new(visitor: AggregateShellVisitor) -> Self {
        Self { visitor }
    }
}

impl NodeMiddleware for ShellVisitorNodeBuilder {
    fn build(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure> {
        match self.visitor.visit(shell, next.tree())? {
            Visited::Done(value) => Ok(value),
            Visited::Continue(shell) | Visited::Restart(shell) => next.run(shell),
        }
    }
}

/// Tags failures raised by the type dispatch with the node path.
pub(crate) struct ErrorCatcherNodeBuilder;

impl NodeMiddleware for ErrorCatcherNodeBuilder {
    fn build(&self, shell: Shell, next: Next<'_>) -> Result<Value, Failure> {
        let path = shell.path().clone();
        next.run(shell).map_err(|failure| failure.located(&path))
    }
}

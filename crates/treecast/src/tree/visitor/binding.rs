use indexmap::IndexMap;
use log::debug;
use treecast_core::types::Type;

use crate::{
    error::ErrorKind,
    hooks::ObjectBinder,
    tree::{
        Failure, Shell, TreeBuilder,
        visitor::{ShellVisitor, Visited},
    },
};

/// Settles class nodes that have a registered binder, skipping parameter
/// mapping entirely.
pub(crate) struct ObjectBindingShellVisitor {
    binders: IndexMap<String, ObjectBinder>,
}

impl ObjectBindingShellVisitor {
    pub(crate) fn new(binders: IndexMap<String, ObjectBinder>) -> Self {
        Self { binders }
    }
}

impl ShellVisitor for ObjectBindingShellVisitor {
    fn visit(&self, shell: Shell, _: &TreeBuilder) -> Result<Visited, Failure> {
        let (Type::Class(class), Some(input)) = (shell.ty(), shell.input()) else {
            return Ok(Visited::Continue(shell));
        };
        let Some(binder) = self.binders.get(class.name()) else {
            return Ok(Visited::Continue(shell));
        };

        debug!(path:% = shell.path(), class = class.name(); "Binding object");
        binder(input).map(Visited::Done).map_err(|reason| {
            Failure::message(
                ErrorKind::ConstructionFailed,
                format!("could not build `{}`: {reason}", class.name()),
            )
        })
    }
}

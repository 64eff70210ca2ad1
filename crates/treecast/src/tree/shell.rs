//! The per-node mapping context.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::Value as JsonValue;
use treecast_core::{definition::Attributes, types::Type, value::Value};

use crate::tree::Path;

/// Nodes built inside a union member attempt. They are reported to the
/// observers only once the member is chosen, and dropped with it otherwise.
#[derive(Clone, Default)]
pub(crate) struct Observations(Arc<Mutex<Vec<(Shell, Value)>>>);

impl Observations {
    pub(crate) fn push(&self, shell: Shell, value: Value) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((shell, value));
    }

    pub(crate) fn extend(&self, observed: Vec<(Shell, Value)>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(observed);
    }

    pub(crate) fn take(&self) -> Vec<(Shell, Value)> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl fmt::Debug for Observations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let held = self.0.lock().map(|held| held.len()).unwrap_or_default();
        f.debug_tuple("Observations").field(&held).finish()
    }
}

/// Everything needed to map one node of the input: the target type, where
/// the node sits, its raw value and the attributes of the declaration site
/// it was reached through.
///
/// An input of `None` means the value is absent, which is distinct from an
/// explicit `null`.
#[derive(Debug, Clone)]
pub struct Shell {
    ty: Type,
    path: Path,
    input: Option<JsonValue>,
    attributes: Attributes,
    depth: usize,
    attempt: bool,
    observations: Option<Observations>,
}

impl Shell {
    pub(crate) fn root(ty: Type, input: JsonValue) -> Self {
        Self {
            ty,
            path: Path::root(),
            input: Some(input),
            attributes: Attributes::empty(),
            depth: 0,
            attempt: false,
            observations: None,
        }
    }

    /// A nested node, one level deeper than `self`.
    pub(crate) fn child(&self, path: Path, ty: Type, input: Option<JsonValue>) -> Self {
        Self {
            ty,
            path,
            input,
            attributes: Attributes::empty(),
            depth: self.depth + 1,
            attempt: false,
            observations: self.observations.clone(),
        }
    }

    /// The same node mapped against another type, for trying union members.
    ///
    /// An attempt stays at the depth of the union node it was made for.
    pub(crate) fn attempt(&self, ty: Type) -> Self {
        Self {
            ty,
            attempt: true,
            ..self.clone()
        }
    }

    /// Whether this shell tries a union member on behalf of its union node.
    pub(crate) fn is_attempt(&self) -> bool {
        self.attempt
    }

    /// Where nodes built below this one are held back, if anywhere.
    pub(crate) fn observations(&self) -> Option<&Observations> {
        self.observations.as_ref()
    }

    pub(crate) fn with_observations(mut self, observations: Observations) -> Self {
        self.observations = Some(observations);
        self
    }

    pub(crate) fn with_type(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    pub(crate) fn with_input(mut self, input: Option<JsonValue>) -> Self {
        self.input = input;
        self
    }

    pub(crate) fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Drop `key` from a mapping input.
    pub(crate) fn without_key(mut self, key: &str) -> Self {
        if let Some(JsonValue::Object(entries)) = &mut self.input {
            entries.shift_remove(key);
        }
        self
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn input(&self) -> Option<&JsonValue> {
        self.input.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Number of nodes between the root and this one.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

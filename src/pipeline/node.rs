// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::errors::CompositionError;
use crate::pipeline::SlotBinding;
use crate::traits::NodeFunction;

/// An immutable unit of computation: a name, declared slots, and the callable
/// that computes the outputs from the inputs and parameters.
///
/// Nodes are cheap to clone; the callable is shared behind an `Arc`.
///
/// ```
/// use std::collections::HashMap;
/// use pipeline_boot::pipeline::Node;
/// use pipeline_boot::traits::{NodeArgs, NodeOutputs};
/// use pipeline_boot::errors::NodeError;
///
/// let double = Node::new("double", |args: &NodeArgs| -> Result<NodeOutputs, NodeError> {
///     let x: f64 = args.input_as("x")?;
///     Ok(HashMap::from([("y".to_string(), serde_json::json!(x * 2.0))]))
/// })
/// .with_inputs(["x"])
/// .with_outputs(["y"]);
///
/// assert_eq!(double.inputs().collect::<Vec<_>>(), vec!["x"]);
/// ```
#[derive(Clone)]
pub struct Node {
    name: String,
    func: Arc<dyn NodeFunction>,
    inputs: Vec<SlotBinding>,
    outputs: Vec<SlotBinding>,
    parameters: Vec<SlotBinding>,
    tags: BTreeSet<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, func: impl NodeFunction + 'static) -> Self {
        Self::from_arc(name, Arc::new(func))
    }

    pub fn from_arc(name: impl Into<String>, func: Arc<dyn NodeFunction>) -> Self {
        Self {
            name: name.into(),
            func,
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(SlotBinding::new).collect();
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(SlotBinding::new).collect();
        self
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(SlotBinding::new).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn func(&self) -> &Arc<dyn NodeFunction> {
        &self.func
    }

    /// Dataset names consumed by this node.
    pub fn inputs(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|s| s.dataset.as_str())
    }

    /// Dataset names produced by this node.
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|s| s.dataset.as_str())
    }

    /// Parameter names bound at invocation time.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|s| s.dataset.as_str())
    }

    pub fn input_bindings(&self) -> &[SlotBinding] {
        &self.inputs
    }

    pub fn output_bindings(&self) -> &[SlotBinding] {
        &self.outputs
    }

    pub fn parameter_bindings(&self) -> &[SlotBinding] {
        &self.parameters
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Namespace portion of the node name (everything before the last `.`).
    pub fn namespace(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(ns, _)| ns)
    }

    /// Copy of this node with a new name and every dataset/parameter name
    /// passed through the given rename functions.
    pub(crate) fn renamed(
        &self,
        name: String,
        dataset: impl Fn(&str) -> String,
        parameter: impl Fn(&str) -> String,
    ) -> Self {
        Self {
            name,
            func: Arc::clone(&self.func),
            inputs: self
                .inputs
                .iter()
                .map(|s| s.rebind(dataset(&s.dataset)))
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|s| s.rebind(dataset(&s.dataset)))
                .collect(),
            parameters: self
                .parameters
                .iter()
                .map(|s| s.rebind(parameter(&s.dataset)))
                .collect(),
            tags: self.tags.clone(),
        }
    }

    /// Structural checks on a single node.
    pub(crate) fn validate(&self) -> Result<(), CompositionError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("node name must not be empty"));
        }

        let mut locals = HashSet::new();
        for slot in self.inputs.iter().chain(&self.parameters) {
            if slot.dataset.is_empty() {
                return Err(self.invalid("slot names must not be empty"));
            }
            if !locals.insert(slot.local.as_str()) {
                return Err(self.invalid(&format!(
                    "'{}' is declared more than once across inputs and parameters",
                    slot.local
                )));
            }
        }

        let mut produced = HashSet::new();
        for slot in &self.outputs {
            if slot.dataset.is_empty() {
                return Err(self.invalid("slot names must not be empty"));
            }
            if !produced.insert(slot.dataset.as_str()) {
                return Err(CompositionError::OutputNotUnique {
                    output: slot.dataset.clone(),
                    first: self.name.clone(),
                    second: self.name.clone(),
                });
            }
        }

        if let Some(looped) = self.inputs().find(|i| produced.contains(i)) {
            tracing::debug!(node = %self.name, dataset = looped, "node consumes its own output");
            return Err(CompositionError::Cycle {
                cycle: vec![self.name.clone(), self.name.clone()],
            });
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> CompositionError {
        CompositionError::InvalidNode {
            node: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("inputs", &self.inputs().collect::<Vec<_>>())
            .field("outputs", &self.outputs().collect::<Vec<_>>())
            .field("parameters", &self.parameters().collect::<Vec<_>>())
            .field("tags", &self.tags)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}([{}]) -> [{}]",
            self.name,
            self.inputs().collect::<Vec<_>>().join(", "),
            self.outputs().collect::<Vec<_>>().join(", ")
        )
    }
}

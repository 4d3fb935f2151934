// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::CompositionError;
use crate::pipeline::{Namespace, Pipeline, SlotMapping};

/// Builder for a modular pipeline: several parts concatenated, then
/// optionally remapped and namespaced as one unit.
///
/// Created by [`pipeline`].
#[derive(Debug, Clone)]
pub struct ModularPipeline {
    parts: Vec<Pipeline>,
    namespace: Namespace,
}

/// Start a modular pipeline from one or more parts.
///
/// ```
/// use pipeline_boot::pipeline::{pipeline, Node, Pipeline};
/// use pipeline_boot::traits::{NodeArgs, NodeOutputs};
/// use pipeline_boot::errors::NodeError;
///
/// fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
///     Ok(NodeOutputs::new())
/// }
///
/// let train = Pipeline::new(vec![Node::new("train", noop)
///     .with_inputs(["features"])
///     .with_outputs(["regressor"])])
/// .unwrap();
///
/// let training = pipeline([train])
///     .inputs([("features", "features_store")])
///     .namespace("training")
///     .build()
///     .unwrap();
///
/// assert!(training.free_inputs().contains("features_store"));
/// assert!(training.free_outputs().contains("training.regressor"));
/// ```
pub fn pipeline<I>(parts: I) -> ModularPipeline
where
    I: IntoIterator<Item = Pipeline>,
{
    ModularPipeline {
        parts: parts.into_iter().collect(),
        namespace: Namespace::rename_only(),
    }
}

impl ModularPipeline {
    /// Free inputs that keep (or take) the given name instead of being
    /// namespaced.
    pub fn inputs(mut self, inputs: impl Into<SlotMapping>) -> Self {
        self.namespace.inputs = inputs.into();
        self
    }

    /// Outputs that keep (or take) the given name instead of being
    /// namespaced.
    pub fn outputs(mut self, outputs: impl Into<SlotMapping>) -> Self {
        self.namespace.outputs = outputs.into();
        self
    }

    pub fn parameters(mut self, parameters: impl Into<SlotMapping>) -> Self {
        self.namespace.parameters = parameters.into();
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace.prefix = Some(namespace.into());
        self
    }

    pub fn build(self) -> Result<Pipeline, CompositionError> {
        let combined = Pipeline::concatenate(&self.parts)?;
        self.namespace.apply(&combined)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::app::AppContract;
use crate::errors::CompositionError;
use crate::observability::messages::composition::AppPipelineCreated;
use crate::observability::messages::StructuredLog;
use crate::pipeline::{Pipeline, SlotMapping};

/// A named pipeline together with the contract it exposes to callers.
///
/// Built with [`app_pipeline`] or [`AppPipeline::builder`]. The contract is
/// checked against the wrapped pipeline when [`AppPipelineBuilder::build`]
/// runs, so an app that exists is always resolvable.
#[derive(Debug, Clone)]
pub struct AppPipeline {
    name: String,
    pipeline: Pipeline,
    contract: AppContract,
}

impl AppPipeline {
    pub fn builder(pipeline: Pipeline, name: impl Into<String>) -> AppPipelineBuilder {
        AppPipelineBuilder {
            name: name.into(),
            pipeline,
            contract: AppContract::default(),
        }
    }

    /// Expose a plain pipeline with an empty contract. Every free input is
    /// read from the catalog and every output is saved back to it.
    pub fn from_pipeline(name: impl Into<String>, pipeline: Pipeline) -> Self {
        Self {
            name: name.into(),
            pipeline,
            contract: AppContract::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn contract(&self) -> &AppContract {
        &self.contract
    }

    pub fn inputs(&self) -> &SlotMapping {
        &self.contract.inputs
    }

    pub fn parameters(&self) -> &SlotMapping {
        &self.contract.parameters
    }

    pub fn artifacts(&self) -> &SlotMapping {
        &self.contract.artifacts
    }

    pub fn outputs(&self) -> &SlotMapping {
        &self.contract.outputs
    }

    /// Free inputs of the wrapped pipeline that the caller does not supply:
    /// declared artifacts plus everything left internal.
    pub fn catalog_inputs(&self) -> BTreeSet<String> {
        let supplied: BTreeSet<&str> = self.contract.inputs.values().collect();
        self.pipeline
            .free_inputs()
            .into_iter()
            .filter(|i| !supplied.contains(i.as_str()))
            .collect()
    }

    /// Parameter slots the caller does not supply.
    pub fn catalog_parameters(&self) -> BTreeSet<String> {
        let supplied: BTreeSet<&str> = self.contract.parameters.values().collect();
        self.pipeline
            .parameters()
            .into_iter()
            .filter(|p| !supplied.contains(p.as_str()))
            .collect()
    }
}

/// Builder returned by [`app_pipeline`].
#[derive(Debug, Clone)]
pub struct AppPipelineBuilder {
    name: String,
    pipeline: Pipeline,
    contract: AppContract,
}

/// Wrap `pipeline` as an app named `name`.
///
/// ```
/// use pipeline_boot::app::app_pipeline;
/// use pipeline_boot::pipeline::{Node, Pipeline};
/// use pipeline_boot::traits::{NodeArgs, NodeOutputs};
/// use pipeline_boot::errors::NodeError;
///
/// fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
///     Ok(NodeOutputs::new())
/// }
///
/// let estimate = Pipeline::new(vec![Node::new("estimate_pi", noop)
///     .with_inputs(["distances"])
///     .with_outputs(["pi"])])
/// .unwrap();
///
/// let app = app_pipeline(estimate, "estimate_pi")
///     .inputs("distances")
///     .outputs("pi")
///     .build()
///     .unwrap();
///
/// assert_eq!(app.outputs().get("pi"), Some("pi"));
/// ```
pub fn app_pipeline(pipeline: Pipeline, name: impl Into<String>) -> AppPipelineBuilder {
    AppPipeline::builder(pipeline, name)
}

impl AppPipelineBuilder {
    pub fn inputs(mut self, inputs: impl Into<SlotMapping>) -> Self {
        self.contract.inputs = inputs.into();
        self
    }

    pub fn parameters(mut self, parameters: impl Into<SlotMapping>) -> Self {
        self.contract.parameters = parameters.into();
        self
    }

    /// Inputs resolved from the data catalog, typically outputs of another
    /// app. Lineage is not checked.
    pub fn artifacts(mut self, artifacts: impl Into<SlotMapping>) -> Self {
        self.contract.artifacts = artifacts.into();
        self
    }

    pub fn outputs(mut self, outputs: impl Into<SlotMapping>) -> Self {
        self.contract.outputs = outputs.into();
        self
    }

    pub fn build(self) -> Result<AppPipeline, CompositionError> {
        if self.name.trim().is_empty() {
            return Err(CompositionError::InvalidNode {
                node: self.name,
                reason: "app pipeline name must not be empty".to_string(),
            });
        }
        self.contract.validate(&self.name, &self.pipeline)?;

        AppPipelineCreated {
            name: &self.name,
            node_count: self.pipeline.len(),
            input_count: self.contract.inputs.len(),
            parameter_count: self.contract.parameters.len(),
            artifact_count: self.contract.artifacts.len(),
            output_count: self.contract.outputs.len(),
        }
        .log();

        Ok(AppPipeline {
            name: self.name,
            pipeline: self.pipeline,
            contract: self.contract,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeError;
    use crate::pipeline::{Node, SlotKind};
    use crate::traits::{NodeArgs, NodeOutputs};

    fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        Ok(NodeOutputs::new())
    }

    fn evaluation() -> Pipeline {
        Pipeline::new(vec![
            Node::new("predict", noop)
                .with_inputs(["regressor", "X_test"])
                .with_outputs(["y_pred"]),
            Node::new("evaluate", noop)
                .with_inputs(["y_pred", "y_test"])
                .with_outputs(["score"])
                .with_parameters(["metric"]),
        ])
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_with_contract() {
        let app = app_pipeline(evaluation(), "evaluation")
            .inputs([("features", "X_test"), ("labels", "y_test")])
            .artifacts("regressor")
            .outputs(["score", "y_pred"])
            .build()
            .unwrap();

        assert_eq!(app.name(), "evaluation");
        assert_eq!(app.inputs().get("features"), Some("X_test"));
        assert_eq!(app.catalog_inputs(), set(&["regressor"]));
        // metric is left internal and comes from configuration
        assert_eq!(app.catalog_parameters(), set(&["metric"]));
        // an intermediate output can be exposed
        assert_eq!(app.outputs().get("y_pred"), Some("y_pred"));
    }

    #[test]
    fn test_unresolved_contract_fails_build() {
        let result = app_pipeline(evaluation(), "evaluation")
            .inputs("y_pred")
            .build();

        assert_eq!(
            result.err(),
            Some(CompositionError::UnresolvedSlot {
                kind: SlotKind::Input,
                slot: "y_pred".to_string(),
                context: "app pipeline 'evaluation'".to_string(),
            })
        );
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let result = app_pipeline(evaluation(), " ").build();
        assert!(matches!(result, Err(CompositionError::InvalidNode { .. })));
    }

    #[test]
    fn test_from_pipeline_has_empty_contract() {
        let app = AppPipeline::from_pipeline("evaluation", evaluation());

        assert!(app.contract().is_empty());
        assert_eq!(
            app.catalog_inputs(),
            set(&["X_test", "regressor", "y_test"])
        );
        assert_eq!(app.catalog_parameters(), set(&["metric"]));
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::ops::Add;

use crate::app::AppPipeline;
use crate::errors::CompositionError;
use crate::pipeline::Pipeline;

/// Several app pipelines registered under one identifier.
///
/// Apps in a set have unique names and pairwise disjoint node sets, and their
/// union must itself be a valid pipeline (no shared outputs, no cycles).
#[derive(Debug, Clone)]
pub struct AppPipelineSet {
    apps: BTreeMap<String, AppPipeline>,
    combined: Pipeline,
}

impl AppPipelineSet {
    pub fn new<I>(apps: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = AppPipeline>,
    {
        let mut by_name = BTreeMap::new();
        for app in apps {
            if by_name.contains_key(app.name()) {
                return Err(CompositionError::DuplicateApp {
                    name: app.name().to_string(),
                });
            }
            by_name.insert(app.name().to_string(), app);
        }

        let combined = Pipeline::concatenate(by_name.values().map(AppPipeline::pipeline))?;

        Ok(Self {
            apps: by_name,
            combined,
        })
    }

    pub fn get(&self, name: &str) -> Option<&AppPipeline> {
        self.apps.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.apps.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppPipeline> {
        self.apps.values()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Union of every member's nodes.
    pub fn pipeline(&self) -> &Pipeline {
        &self.combined
    }

    pub fn with(self, app: AppPipeline) -> Result<Self, CompositionError> {
        Self::new(self.apps.into_values().chain(std::iter::once(app)))
    }
}

impl TryFrom<AppPipeline> for AppPipelineSet {
    type Error = CompositionError;

    fn try_from(app: AppPipeline) -> Result<Self, Self::Error> {
        Self::new([app])
    }
}

impl Add for AppPipeline {
    type Output = Result<AppPipelineSet, CompositionError>;

    fn add(self, rhs: AppPipeline) -> Self::Output {
        AppPipelineSet::new([self, rhs])
    }
}

impl Add<AppPipeline> for AppPipelineSet {
    type Output = Result<AppPipelineSet, CompositionError>;

    fn add(self, rhs: AppPipeline) -> Self::Output {
        self.with(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::app_pipeline;
    use crate::errors::NodeError;
    use crate::pipeline::Node;
    use crate::traits::{NodeArgs, NodeOutputs};

    fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        Ok(NodeOutputs::new())
    }

    fn simulate() -> AppPipeline {
        let p = Pipeline::new(vec![Node::new("simulate_distance", noop)
            .with_outputs(["distance"])
            .with_parameters(["radius"])])
        .unwrap();
        app_pipeline(p, "simulate_distance")
            .parameters("radius")
            .build()
            .unwrap()
    }

    fn estimate() -> AppPipeline {
        let p = Pipeline::new(vec![Node::new("estimate_pi", noop)
            .with_inputs(["distances"])
            .with_outputs(["pi"])])
        .unwrap();
        app_pipeline(p, "estimate_pi")
            .inputs("distances")
            .outputs("pi")
            .build()
            .unwrap()
    }

    #[test]
    fn test_add_disjoint_apps() {
        let set = (simulate() + estimate()).unwrap();

        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["estimate_pi", "simulate_distance"]
        );
        assert_eq!(set.pipeline().len(), 2);
        assert!(set.get("estimate_pi").is_some());
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn test_add_chains() {
        let other = Pipeline::new(vec![Node::new("report", noop).with_inputs(["pi"])]).unwrap();
        let report = app_pipeline(other, "report").build().unwrap();

        let set = ((simulate() + estimate()).unwrap() + report).unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_overlapping_nodes_are_rejected() {
        let copy = AppPipeline::from_pipeline("estimate_again", estimate().pipeline().clone());

        assert_eq!(
            (estimate() + copy).err(),
            Some(CompositionError::DuplicateNode {
                node: "estimate_pi".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_app_names_are_rejected() {
        let p = Pipeline::new(vec![Node::new("other", noop).with_outputs(["x"])]).unwrap();
        let clash = AppPipeline::from_pipeline("estimate_pi", p);

        assert_eq!(
            (estimate() + clash).err(),
            Some(CompositionError::DuplicateApp {
                name: "estimate_pi".to_string()
            })
        );
    }

    #[test]
    fn test_single_app_set() {
        let set = AppPipelineSet::try_from(estimate()).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
    }
}

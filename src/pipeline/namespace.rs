// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Namespacing and slot remapping.
//!
//! Namespacing prefixes every node name and every input/output dataset with
//! `prefix.`, so two copies of the same sub-pipeline never collide. Datasets
//! listed in the input/output overrides punch through the namespace: they are
//! rewritten to the override value verbatim instead of being prefixed.
//! Parameters are shared configuration and are never prefixed; they can only
//! be renamed through explicit parameter overrides.
//!
//! Override keys name slots of the operand pipeline as it is *before* this
//! rename. Everything downstream (further namespacing, app contracts) sees the
//! rewritten names.

use std::collections::BTreeMap;

use crate::config::consts::NAMESPACE_SEPARATOR;
use crate::errors::CompositionError;
use crate::observability::messages::composition::NamespaceApplied;
use crate::observability::messages::StructuredLog;
use crate::pipeline::{Pipeline, SlotKind, SlotMapping};

/// A namespace (optional) plus the punch-through overrides applied with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: Option<String>,
    pub inputs: SlotMapping,
    pub outputs: SlotMapping,
    pub parameters: SlotMapping,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    /// Overrides only; names that are not overridden stay as they are.
    pub fn rename_only() -> Self {
        Self::default()
    }

    pub fn with_inputs(mut self, inputs: impl Into<SlotMapping>) -> Self {
        self.inputs = inputs.into();
        self
    }

    pub fn with_outputs(mut self, outputs: impl Into<SlotMapping>) -> Self {
        self.outputs = outputs.into();
        self
    }

    pub fn with_parameters(mut self, parameters: impl Into<SlotMapping>) -> Self {
        self.parameters = parameters.into();
        self
    }

    fn describe(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("namespace '{}'", prefix),
            None => "pipeline remapping".to_string(),
        }
    }

    fn prefixed(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, name)
            }
            _ => name.to_string(),
        }
    }

    /// Check every override key against the operand and merge the input and
    /// output overrides into one dataset rename table.
    fn resolve(&self, pipeline: &Pipeline) -> Result<BTreeMap<String, String>, CompositionError> {
        let free_inputs = pipeline.free_inputs();
        let all_outputs = pipeline.all_outputs();
        let parameters = pipeline.parameters();

        let unresolved = |kind: SlotKind, slot: &str| CompositionError::UnresolvedSlot {
            kind,
            slot: slot.to_string(),
            context: self.describe(),
        };

        if let Some(slot) = self.inputs.keys().find(|k| !free_inputs.contains(*k)) {
            return Err(unresolved(SlotKind::Input, slot));
        }
        if let Some(slot) = self.outputs.keys().find(|k| !all_outputs.contains(*k)) {
            return Err(unresolved(SlotKind::Output, slot));
        }
        if let Some(slot) = self.parameters.keys().find(|k| !parameters.contains(*k)) {
            return Err(unresolved(SlotKind::Parameter, slot));
        }

        Ok(self
            .inputs
            .iter()
            .chain(self.outputs.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }

    /// Apply this namespace to `pipeline`, producing a new pipeline.
    pub fn apply(&self, pipeline: &Pipeline) -> Result<Pipeline, CompositionError> {
        let datasets = self.resolve(pipeline)?;

        let rename_dataset = |name: &str| match datasets.get(name) {
            Some(replacement) => replacement.clone(),
            None => self.prefixed(name),
        };
        let rename_parameter = |name: &str| match self.parameters.get(name) {
            Some(replacement) => replacement.to_string(),
            None => name.to_string(),
        };

        let renamed = Pipeline::new(pipeline.nodes().map(|node| {
            node.renamed(
                self.prefixed(node.name()),
                &rename_dataset,
                &rename_parameter,
            )
        }))?;

        NamespaceApplied {
            namespace: self.prefix.as_deref().unwrap_or(""),
            node_count: renamed.len(),
            override_count: datasets.len() + self.parameters.len(),
        }
        .log();

        Ok(renamed)
    }
}

impl Pipeline {
    /// Prefix every node and dataset with `prefix.`.
    pub fn namespace(&self, prefix: &str) -> Result<Pipeline, CompositionError> {
        Namespace::new(prefix).apply(self)
    }

    /// Prefix with `prefix.`, except for the overridden inputs and outputs,
    /// which are rewritten verbatim.
    pub fn namespace_with(
        &self,
        prefix: &str,
        input_overrides: impl Into<SlotMapping>,
        output_overrides: impl Into<SlotMapping>,
    ) -> Result<Pipeline, CompositionError> {
        Namespace::new(prefix)
            .with_inputs(input_overrides)
            .with_outputs(output_overrides)
            .apply(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeError;
    use crate::pipeline::Node;
    use crate::traits::{NodeArgs, NodeOutputs};
    use std::collections::BTreeSet;

    fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        Ok(NodeOutputs::new())
    }

    fn estimate() -> Pipeline {
        Pipeline::new(vec![
            Node::new("n1", noop).with_outputs(["d"]),
            Node::new("n2", noop)
                .with_inputs(["d"])
                .with_outputs(["pi"])
                .with_parameters(["radius"]),
        ])
        .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_namespace_prefixes_everything() {
        let p = estimate().namespace("ns").unwrap();

        assert_eq!(p.node_names().collect::<Vec<_>>(), vec!["ns.n1", "ns.n2"]);
        assert_eq!(p.all_outputs(), set(&["ns.d", "ns.pi"]));
        assert_eq!(p.all_inputs(), set(&["ns.d"]));
        // parameters are shared configuration
        assert_eq!(p.parameters(), set(&["radius"]));
        // the edge survives the rename
        assert_eq!(p.producer_of("ns.d"), Some("ns.n1"));
        assert_eq!(p.dependency_graph().edge_count(), 1);
    }

    #[test]
    fn test_output_punch_through() {
        let p = estimate()
            .namespace_with("ns", SlotMapping::new(), [("pi", "pi")])
            .unwrap();

        assert_eq!(p.free_outputs(), set(&["pi"]));
        assert_eq!(p.all_outputs(), set(&["ns.d", "pi"]));
    }

    #[test]
    fn test_input_override_to_other_namespace() {
        let predict = Pipeline::new(vec![Node::new("predict", noop)
            .with_inputs(["regressor", "features"])
            .with_outputs(["predictions"])])
        .unwrap();

        let p = Namespace::new("inference")
            .with_inputs([("regressor", "training.regressor")])
            .apply(&predict)
            .unwrap();

        assert_eq!(
            p.free_inputs(),
            set(&["inference.features", "training.regressor"])
        );
        assert_eq!(p.free_outputs(), set(&["inference.predictions"]));
    }

    #[test]
    fn test_double_namespace_composes() {
        let p = estimate().namespace("inner").unwrap().namespace("outer").unwrap();

        assert_eq!(
            p.node_names().collect::<Vec<_>>(),
            vec!["outer.inner.n1", "outer.inner.n2"]
        );
        assert_eq!(p.free_outputs(), set(&["outer.inner.pi"]));
    }

    #[test]
    fn test_two_instances_do_not_collide() {
        let a = estimate().namespace("a").unwrap();
        let b = estimate().namespace("b").unwrap();

        let both = (&a + &b).unwrap();
        assert_eq!(both.len(), 4);
        assert_eq!(both.free_outputs(), set(&["a.pi", "b.pi"]));
        // without namespacing the same copies collide
        assert!((estimate() + estimate()).is_err());
    }

    #[test]
    fn test_rename_only_keeps_other_names() {
        let p = Namespace::rename_only()
            .with_inputs([("d", "distances")])
            .apply(&estimate().only_nodes(["n2"]).unwrap())
            .unwrap();

        assert_eq!(p.node_names().collect::<Vec<_>>(), vec!["n2"]);
        assert_eq!(p.free_inputs(), set(&["distances"]));
        assert_eq!(p.free_outputs(), set(&["pi"]));
        // the function still sees its local name
        let node = p.node("n2").unwrap();
        assert_eq!(node.input_bindings()[0].local, "d");
    }

    #[test]
    fn test_parameter_override() {
        let p = Namespace::new("ns")
            .with_parameters([("radius", "circle.radius")])
            .apply(&estimate())
            .unwrap();

        assert_eq!(p.parameters(), set(&["circle.radius"]));
    }

    #[test]
    fn test_unresolved_overrides() {
        struct TestCase {
            name: &'static str,
            namespace: Namespace,
            expected_kind: SlotKind,
            expected_slot: &'static str,
        }

        let test_cases = vec![
            TestCase {
                name: "input that does not exist",
                namespace: Namespace::new("ns").with_inputs("missing"),
                expected_kind: SlotKind::Input,
                expected_slot: "missing",
            },
            TestCase {
                name: "input that is produced internally",
                namespace: Namespace::new("ns").with_inputs("d"),
                expected_kind: SlotKind::Input,
                expected_slot: "d",
            },
            TestCase {
                name: "output that does not exist",
                namespace: Namespace::new("ns").with_outputs("tau"),
                expected_kind: SlotKind::Output,
                expected_slot: "tau",
            },
            TestCase {
                name: "parameter that does not exist",
                namespace: Namespace::new("ns").with_parameters("diameter"),
                expected_kind: SlotKind::Parameter,
                expected_slot: "diameter",
            },
        ];

        for test_case in test_cases {
            let result = test_case.namespace.apply(&estimate());
            assert_eq!(
                result.err(),
                Some(CompositionError::UnresolvedSlot {
                    kind: test_case.expected_kind,
                    slot: test_case.expected_slot.to_string(),
                    context: "namespace 'ns'".to_string(),
                }),
                "Test case '{}'",
                test_case.name
            );
        }
    }

    #[test]
    fn test_overrides_that_merge_outputs_are_rejected() {
        let p = Pipeline::new(vec![
            Node::new("a", noop).with_outputs(["x"]),
            Node::new("b", noop).with_outputs(["y"]),
        ])
        .unwrap();

        let result = Namespace::new("ns")
            .with_outputs([("x", "shared"), ("y", "shared")])
            .apply(&p);
        assert!(matches!(
            result,
            Err(CompositionError::OutputNotUnique { .. })
        ));
    }
}

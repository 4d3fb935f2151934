// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Add;

use crate::errors::CompositionError;
use crate::observability::messages::composition::PipelineAssembled;
use crate::observability::messages::StructuredLog;
use crate::pipeline::validation::{validate_nodes, ValidatedGraph};
use crate::pipeline::{DependencyGraph, Node};

/// An immutable, validated set of nodes plus the dependency structure derived
/// from their slot names.
///
/// Every transform (`only_nodes`, `namespace`, `concatenate`, `+`) returns a
/// new `Pipeline`; operands are never modified. Construction fails with a
/// [`CompositionError`] if node names collide, two nodes produce the same
/// dataset, or the inferred edges contain a cycle.
#[derive(Clone)]
pub struct Pipeline {
    nodes: BTreeMap<String, Node>,
    producers: BTreeMap<String, String>,
    graph: DependencyGraph,
}

impl Pipeline {
    pub fn new<I>(nodes: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        let ValidatedGraph { producers, graph } = validate_nodes(&nodes)?;

        let pipeline = Self {
            nodes: nodes
                .into_iter()
                .map(|n| (n.name().to_string(), n))
                .collect(),
            producers,
            graph,
        };

        PipelineAssembled {
            node_count: pipeline.len(),
            edge_count: pipeline.graph.edge_count(),
            free_input_count: pipeline.free_inputs().len(),
            free_output_count: pipeline.free_outputs().len(),
        }
        .log();

        Ok(pipeline)
    }

    pub fn empty() -> Self {
        Self {
            nodes: BTreeMap::new(),
            producers: BTreeMap::new(),
            graph: DependencyGraph::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes sorted by name.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Name of the node producing `dataset`, if any.
    pub fn producer_of(&self, dataset: &str) -> Option<&str> {
        self.producers.get(dataset).map(String::as_str)
    }

    pub fn all_inputs(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|n| n.inputs().map(str::to_string))
            .collect()
    }

    pub fn all_outputs(&self) -> BTreeSet<String> {
        self.producers.keys().cloned().collect()
    }

    /// Inputs not produced by any node in the pipeline.
    pub fn free_inputs(&self) -> BTreeSet<String> {
        self.all_inputs()
            .into_iter()
            .filter(|i| !self.producers.contains_key(i))
            .collect()
    }

    /// Outputs not consumed by any node in the pipeline.
    pub fn free_outputs(&self) -> BTreeSet<String> {
        let consumed = self.all_inputs();
        self.producers
            .keys()
            .filter(|o| !consumed.contains(*o))
            .cloned()
            .collect()
    }

    /// Union of all node parameter slots.
    pub fn parameters(&self) -> BTreeSet<String> {
        self.nodes
            .values()
            .flat_map(|n| n.parameters().map(str::to_string))
            .collect()
    }

    /// Nodes grouped by dependency depth. See
    /// [`DependencyGraph::topological_levels`].
    pub fn topological_levels(&self) -> Vec<Vec<&Node>> {
        // The graph was checked for cycles at construction.
        self.graph
            .topological_levels()
            .unwrap_or_default()
            .into_iter()
            .map(|level| level.iter().filter_map(|name| self.nodes.get(name)).collect())
            .collect()
    }

    /// One valid execution order: level by level, by name within a level.
    pub fn nodes_in_order(&self) -> Vec<&Node> {
        self.topological_levels().into_iter().flatten().collect()
    }

    /// A pipeline containing exactly the named nodes.
    ///
    /// Fails with [`CompositionError::UnknownNode`] listing every name that is
    /// not part of this pipeline.
    pub fn only_nodes<I, S>(&self, names: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        let unknown: Vec<String> = names
            .iter()
            .filter(|n| !self.nodes.contains_key(*n))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(CompositionError::UnknownNode {
                nodes: unknown,
                context: "only_nodes".to_string(),
            });
        }

        Self::new(names.iter().filter_map(|n| self.nodes.get(n)).cloned())
    }

    /// A pipeline with the nodes carrying at least one of `tags`.
    pub fn only_nodes_with_tags<I, S>(&self, tags: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<S> = tags.into_iter().collect();
        Self::new(
            self.nodes
                .values()
                .filter(|n| tags.iter().any(|t| n.has_tag(t.as_ref())))
                .cloned(),
        )
    }

    /// A pipeline with the nodes living under `namespace` (names starting with
    /// `namespace.`).
    pub fn only_nodes_with_namespace(&self, namespace: &str) -> Result<Self, CompositionError> {
        let prefix = format!("{}.", namespace);
        let selected: Vec<Node> = self
            .nodes
            .values()
            .filter(|n| n.name().starts_with(&prefix))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(CompositionError::UnknownNode {
                nodes: vec![format!("{}*", prefix)],
                context: "only_nodes_with_namespace".to_string(),
            });
        }
        Self::new(selected)
    }

    /// Disjoint union of several pipelines.
    ///
    /// A node name present in more than one operand is a
    /// [`CompositionError::DuplicateNode`]; the union is then re-validated for
    /// output uniqueness and acyclicity.
    pub fn concatenate<'a, I>(pipelines: I) -> Result<Self, CompositionError>
    where
        I: IntoIterator<Item = &'a Pipeline>,
    {
        Self::new(
            pipelines
                .into_iter()
                .flat_map(|p| p.nodes.values().cloned()),
        )
    }

    /// `self + other` without the operator.
    pub fn join(&self, other: &Pipeline) -> Result<Self, CompositionError> {
        Self::concatenate([self, other])
    }
}

impl Add for &Pipeline {
    type Output = Result<Pipeline, CompositionError>;

    fn add(self, rhs: &Pipeline) -> Self::Output {
        self.join(rhs)
    }
}

impl Add for Pipeline {
    type Output = Result<Pipeline, CompositionError>;

    fn add(self, rhs: Pipeline) -> Self::Output {
        self.join(&rhs)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("free_inputs", &self.free_inputs())
            .field("free_outputs", &self.free_outputs())
            .finish()
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline ({} nodes)", self.len())?;
        for node in self.nodes_in_order() {
            writeln!(f, "  {}", node)?;
        }
        Ok(())
    }
}

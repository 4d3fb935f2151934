// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::errors::CompositionError;

/// Newtype wrapper for the node dependency graph: node name -> dependents.
///
/// Edges are inferred by a [`crate::pipeline::Pipeline`] from dataset names
/// (an edge `a -> b` exists when an output of `a` is an input of `b`). Every
/// node of the pipeline is a key, including nodes without dependents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph(pub BTreeMap<String, BTreeSet<String>>);

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Register a node with no edges yet
    pub fn add_node(&mut self, node: impl Into<String>) {
        self.0.entry(node.into()).or_default();
    }

    /// Add an edge from `producer` to `consumer`
    pub fn add_edge(&mut self, producer: &str, consumer: &str) {
        self.add_node(consumer);
        self.0
            .entry(producer.to_string())
            .or_default()
            .insert(consumer.to_string());
    }

    /// Get dependents for a node
    pub fn get_dependents(&self, node: &str) -> Option<&BTreeSet<String>> {
        self.0.get(node)
    }

    /// Get all node names in the graph
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn edge_count(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Group nodes by dependency depth using Kahn's algorithm.
    ///
    /// Level 0 holds the entry points; every node in level N depends only on
    /// nodes in levels `0..N`. Nodes inside a level are sorted by name. Fails
    /// with [`CompositionError::Cycle`] if some nodes can never be scheduled;
    /// a [`crate::pipeline::Pipeline`] validates acyclicity up front, so this
    /// only triggers for graphs built by hand.
    pub fn topological_levels(&self) -> Result<Vec<Vec<String>>, CompositionError> {
        let mut in_degree: BTreeMap<&str, usize> =
            self.0.keys().map(|k| (k.as_str(), 0)).collect();
        for dependents in self.0.values() {
            for dependent in dependents {
                *in_degree.entry(dependent.as_str()).or_insert(0) += 1;
            }
        }

        let mut levels = Vec::new();
        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut processed = 0;

        while !queue.is_empty() {
            let mut level: Vec<&str> = queue.drain(..).collect();
            level.sort_unstable();
            processed += level.len();

            let mut next = Vec::new();
            for node in &level {
                if let Some(dependents) = self.0.get(*node) {
                    for dependent in dependents {
                        if let Some(count) = in_degree.get_mut(dependent.as_str()) {
                            *count -= 1;
                            if *count == 0 {
                                next.push(dependent.as_str());
                            }
                        }
                    }
                }
            }

            levels.push(level.into_iter().map(str::to_string).collect());
            queue.extend(next);
        }

        if processed != in_degree.len() {
            let stuck = in_degree
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(node, _)| node.to_string())
                .collect();
            return Err(CompositionError::Cycle { cycle: stuck });
        }

        Ok(levels)
    }
}

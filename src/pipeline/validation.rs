// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation for pipeline node sets.
//!
//! A node set becomes a [`crate::pipeline::Pipeline`] only after passing three
//! checks, run in this order:
//!
//! 1. **Uniqueness**: node names are unique, and every dataset has at most one
//!    producer. Two unrelated nodes writing the same output name is an error,
//!    never a silent merge.
//! 2. **Edge inference**: an edge `a -> b` is added when an output of `a` is an
//!    input of `b`.
//! 3. **Cycle detection**: DFS with a recursion stack ("three colors"). When a
//!    back edge is found the exact cycle path is reported.
//!
//! Cycle detection needs a well-formed graph, so it only runs once the first
//! two steps succeed. Unlike config validation that collects every problem,
//! composition is fail-fast: the first error aborts.

use std::collections::{BTreeMap, HashSet};

use crate::errors::CompositionError;
use crate::observability::messages::composition::CyclicDependencyDetected;
use crate::observability::messages::StructuredLog;
use crate::pipeline::{DependencyGraph, Node};

/// Result of validating a node set: who produces each dataset, and the
/// inferred dependency graph.
pub(crate) struct ValidatedGraph {
    pub producers: BTreeMap<String, String>,
    pub graph: DependencyGraph,
}

/// Run every structural check over `nodes`.
pub(crate) fn validate_nodes<'a, I>(nodes: I) -> Result<ValidatedGraph, CompositionError>
where
    I: IntoIterator<Item = &'a Node> + Clone,
{
    for node in nodes.clone() {
        node.validate()?;
    }
    validate_unique_node_names(nodes.clone())?;
    let producers = validate_unique_outputs(nodes.clone())?;
    let graph = infer_dependency_graph(nodes, &producers);
    validate_acyclic_graph(&graph)?;

    Ok(ValidatedGraph { producers, graph })
}

fn validate_unique_node_names<'a, I>(nodes: I) -> Result<(), CompositionError>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut seen = HashSet::new();
    for node in nodes {
        if !seen.insert(node.name()) {
            return Err(CompositionError::DuplicateNode {
                node: node.name().to_string(),
            });
        }
    }
    Ok(())
}

/// Map every dataset to its single producing node.
fn validate_unique_outputs<'a, I>(nodes: I) -> Result<BTreeMap<String, String>, CompositionError>
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut producers: BTreeMap<String, String> = BTreeMap::new();
    for node in nodes {
        for output in node.outputs() {
            if let Some(first) = producers.get(output) {
                return Err(CompositionError::OutputNotUnique {
                    output: output.to_string(),
                    first: first.clone(),
                    second: node.name().to_string(),
                });
            }
            producers.insert(output.to_string(), node.name().to_string());
        }
    }
    Ok(producers)
}

fn infer_dependency_graph<'a, I>(nodes: I, producers: &BTreeMap<String, String>) -> DependencyGraph
where
    I: IntoIterator<Item = &'a Node>,
{
    let mut graph = DependencyGraph::new();
    for node in nodes {
        graph.add_node(node.name());
        for input in node.inputs() {
            if let Some(producer) = producers.get(input) {
                graph.add_edge(producer, node.name());
            }
        }
    }
    graph
}

/// Validates that the dependency graph is acyclic.
///
/// Nodes are visited in name order so the reported cycle is deterministic.
/// For `A -> B -> C -> A` the error carries `[A, B, C, A]`.
///
/// **Time Complexity**: O(V + E)
pub(crate) fn validate_acyclic_graph(graph: &DependencyGraph) -> Result<(), CompositionError> {
    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for node in graph.keys() {
        if !visited.contains(node.as_str()) {
            if let Some(cycle) =
                dfs_cycle_detection(node, graph, &mut visited, &mut rec_stack, &mut path)
            {
                let refs: Vec<&str> = cycle.iter().map(String::as_str).collect();
                CyclicDependencyDetected { cycle: &refs }.log();
                return Err(CompositionError::Cycle { cycle });
            }
        }
    }

    Ok(())
}

/// Depth-first search with recursion-stack tracking.
///
/// Returns the cycle path when a back edge (edge into a node that is still on
/// the recursion stack) is found.
fn dfs_cycle_detection<'g>(
    node: &'g str,
    graph: &'g DependencyGraph,
    visited: &mut HashSet<&'g str>,
    rec_stack: &mut HashSet<&'g str>,
    path: &mut Vec<&'g str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(dependents) = graph.get_dependents(node) {
        for dependent in dependents {
            let dependent = dependent.as_str();
            if !visited.contains(dependent) {
                if let Some(cycle) = dfs_cycle_detection(dependent, graph, visited, rec_stack, path)
                {
                    return Some(cycle);
                }
            } else if rec_stack.contains(dependent) {
                let start = path.iter().position(|n| *n == dependent).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(dependent.to_string());
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeError;
    use crate::traits::{NodeArgs, NodeOutputs};

    fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        Ok(NodeOutputs::new())
    }

    fn create_test_node(name: &str, inputs: &[&str], outputs: &[&str]) -> Node {
        Node::new(name, noop)
            .with_inputs(inputs.iter().copied())
            .with_outputs(outputs.iter().copied())
    }

    #[test]
    fn test_valid_empty_set() {
        let nodes: Vec<Node> = vec![];
        assert!(validate_nodes(&nodes).is_ok());
    }

    #[test]
    fn test_valid_linear_chain() {
        let nodes = vec![
            create_test_node("a", &[], &["x"]),
            create_test_node("b", &["x"], &["y"]),
            create_test_node("c", &["y"], &["z"]),
        ];

        let validated = validate_nodes(&nodes).unwrap();
        assert_eq!(validated.producers["y"], "b");
        assert_eq!(validated.graph.edge_count(), 2);
    }

    #[test]
    fn test_valid_diamond_dependency() {
        let nodes = vec![
            create_test_node("a", &[], &["x"]),
            create_test_node("b", &["x"], &["l"]),
            create_test_node("c", &["x"], &["r"]),
            create_test_node("d", &["l", "r"], &["out"]),
        ];

        assert!(validate_nodes(&nodes).is_ok());
    }

    #[test]
    fn test_duplicate_node_names() {
        let nodes = vec![
            create_test_node("a", &[], &["x"]),
            create_test_node("a", &[], &["y"]),
        ];

        assert_eq!(
            validate_nodes(&nodes).err(),
            Some(CompositionError::DuplicateNode {
                node: "a".to_string()
            })
        );
    }

    #[test]
    fn test_accidental_output_collision() {
        let nodes = vec![
            create_test_node("load_prices", &[], &["data"]),
            create_test_node("load_reviews", &[], &["data"]),
        ];

        assert_eq!(
            validate_nodes(&nodes).err(),
            Some(CompositionError::OutputNotUnique {
                output: "data".to_string(),
                first: "load_prices".to_string(),
                second: "load_reviews".to_string(),
            })
        );
    }

    #[test]
    fn test_simple_cycle() {
        let nodes = vec![
            create_test_node("A", &["b_out"], &["a_out"]),
            create_test_node("B", &["a_out"], &["b_out"]),
        ];

        assert_eq!(
            validate_nodes(&nodes).err(),
            Some(CompositionError::Cycle {
                cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()]
            })
        );
    }

    #[test]
    fn test_complex_cycle() {
        // b -> c -> d -> b, entered from a
        let nodes = vec![
            create_test_node("a", &[], &["a_out"]),
            create_test_node("b", &["a_out", "d_out"], &["b_out"]),
            create_test_node("c", &["b_out"], &["c_out"]),
            create_test_node("d", &["c_out"], &["d_out"]),
        ];

        let result = validate_nodes(&nodes);
        assert!(matches!(result, Err(CompositionError::Cycle { .. })));
        if let Err(CompositionError::Cycle { cycle }) = result {
            assert_eq!(cycle, vec!["b", "c", "d", "b"]);
        }
    }
}

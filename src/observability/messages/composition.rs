// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline composition events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline assembly and cycle detection
//! * Namespacing and slot overrides
//! * App pipeline contract wrapping

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Cyclic dependency detected while assembling a pipeline.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipeline_boot::observability::messages::composition::CyclicDependencyDetected;
///
/// let cycle = vec!["a", "b", "a"];
/// let msg = CyclicDependencyDetected { cycle: &cycle };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [&'a str],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = %self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "cycle_detection",
            span_name = name,
            cycle = %self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
        )
    }
}

/// A node set passed validation and became a pipeline.
///
/// # Log Level
/// `debug!` - Emitted for every intermediate pipeline
pub struct PipelineAssembled {
    pub node_count: usize,
    pub edge_count: usize,
    pub free_input_count: usize,
    pub free_output_count: usize,
}

impl Display for PipelineAssembled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline assembled: {} nodes, {} edges, {} free inputs, {} free outputs",
            self.node_count, self.edge_count, self.free_input_count, self.free_output_count
        )
    }
}

impl StructuredLog for PipelineAssembled {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            edge_count = self.edge_count,
            free_input_count = self.free_input_count,
            free_output_count = self.free_output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "pipeline",
            span_name = name,
            node_count = self.node_count,
            edge_count = self.edge_count,
        )
    }
}

/// A namespace (and its overrides) was applied to a pipeline.
///
/// # Log Level
/// `debug!` - Composition detail
///
/// # Example
/// ```
/// use pipeline_boot::observability::messages::composition::NamespaceApplied;
///
/// let msg = NamespaceApplied {
///     namespace: "training",
///     node_count: 3,
///     override_count: 1,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Namespace 'training' applied to 3 nodes with 1 overrides"
/// );
/// ```
pub struct NamespaceApplied<'a> {
    pub namespace: &'a str,
    pub node_count: usize,
    pub override_count: usize,
}

impl Display for NamespaceApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Namespace '{}' applied to {} nodes with {} overrides",
            self.namespace, self.node_count, self.override_count
        )
    }
}

impl StructuredLog for NamespaceApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            namespace = self.namespace,
            node_count = self.node_count,
            override_count = self.override_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "namespace",
            span_name = name,
            namespace = self.namespace,
            node_count = self.node_count,
        )
    }
}

/// An app pipeline contract was validated.
///
/// # Log Level
/// `debug!` - Composition detail
pub struct AppPipelineCreated<'a> {
    pub name: &'a str,
    pub node_count: usize,
    pub input_count: usize,
    pub parameter_count: usize,
    pub artifact_count: usize,
    pub output_count: usize,
}

impl Display for AppPipelineCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "App pipeline '{}' created over {} nodes: {} inputs, {} parameters, {} artifacts, {} outputs",
            self.name,
            self.node_count,
            self.input_count,
            self.parameter_count,
            self.artifact_count,
            self.output_count
        )
    }
}

impl StructuredLog for AppPipelineCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            app = self.name,
            node_count = self.node_count,
            input_count = self.input_count,
            parameter_count = self.parameter_count,
            artifact_count = self.artifact_count,
            output_count = self.output_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "app_pipeline",
            span_name = name,
            app = self.name,
            node_count = self.node_count,
        )
    }
}

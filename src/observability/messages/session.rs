// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for session lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Session boot on a registry entry
//! * Run lifecycle (start, completion, failure)
//! * Per-node execution
//! * Experiment tracking

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Session booted on a registry entry.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeline_boot::observability::messages::session::SessionStarted;
///
/// let msg = SessionStarted {
///     entry: "monte_carlo",
///     app_count: 2,
///     max_concurrency: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SessionStarted<'a> {
    pub entry: &'a str,
    pub app_count: usize,
    pub max_concurrency: usize,
}

impl Display for SessionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Session started on '{}': {} apps, max_concurrency={}",
            self.entry, self.app_count, self.max_concurrency
        )
    }
}

impl StructuredLog for SessionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            entry = self.entry,
            app_count = self.app_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "session",
            span_name = name,
            entry = self.entry,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// A run of one app pipeline started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStarted<'a> {
    pub pipeline: &'a str,
    pub node_count: usize,
    pub level_count: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running pipeline '{}': {} nodes in {} levels",
            self.pipeline, self.node_count, self.level_count
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            node_count = self.node_count,
            level_count = self.level_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            pipeline = self.pipeline,
            node_count = self.node_count,
            level_count = self.level_count,
        )
    }
}

/// A run finished and returned its outputs.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeline_boot::observability::messages::session::RunCompleted;
/// use std::time::Duration;
///
/// let msg = RunCompleted {
///     pipeline: "estimate_pi",
///     node_count: 2,
///     output_count: 1,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunCompleted<'a> {
    pub pipeline: &'a str,
    pub node_count: usize,
    pub output_count: usize,
    pub duration: Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' completed: {} nodes, {} outputs in {:?}",
            self.pipeline, self.node_count, self.output_count, self.duration
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline = self.pipeline,
            node_count = self.node_count,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            pipeline = self.pipeline,
            duration = ?self.duration,
        )
    }
}

/// A run failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunFailed<'a> {
    pub pipeline: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline '{}' failed: {}", self.pipeline, self.error)
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(
            pipeline = self.pipeline,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_failed",
            span_name = name,
            pipeline = self.pipeline,
            error = %self.error,
        )
    }
}

/// One node finished.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeExecuted<'a> {
    pub pipeline: &'a str,
    pub node: &'a str,
    pub output_count: usize,
    pub duration: Duration,
}

impl Display for NodeExecuted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' produced {} outputs in {:?}",
            self.node, self.output_count, self.duration
        )
    }
}

impl StructuredLog for NodeExecuted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline = self.pipeline,
            node = self.node,
            output_count = self.output_count,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node",
            span_name = name,
            pipeline = self.pipeline,
            node = self.node,
        )
    }
}

/// A queued node was not started because a sibling on its level failed.
///
/// # Log Level
/// `debug!` - Per-node detail
pub struct NodeSkipped<'a> {
    pub pipeline: &'a str,
    pub node: &'a str,
}

impl Display for NodeSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' skipped after a failure on its level", self.node)
    }
}

impl StructuredLog for NodeSkipped<'_> {
    fn log(&self) {
        tracing::debug!(pipeline = self.pipeline, node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node",
            span_name = name,
            pipeline = self.pipeline,
            node = self.node,
        )
    }
}

/// A tracking sink recorded a metric.
///
/// # Log Level
/// `info!` - Experiment result
pub struct MetricLogged<'a> {
    pub run: &'a str,
    pub key: &'a str,
    pub value: f64,
    pub step: Option<u64>,
}

impl Display for MetricLogged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.step {
            Some(step) => write!(
                f,
                "[{}] {} = {} (step {})",
                self.run, self.key, self.value, step
            ),
            None => write!(f, "[{}] {} = {}", self.run, self.key, self.value),
        }
    }
}

impl StructuredLog for MetricLogged<'_> {
    fn log(&self) {
        tracing::info!(
            run = self.run,
            metric = self.key,
            value = self.value,
            step = ?self.step,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "metric",
            span_name = name,
            run = self.run,
            metric = self.key,
        )
    }
}

/// A session configuration file was loaded.
///
/// # Log Level
/// `info!` - Startup event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub pipeline: &'a str,
    pub parameter_count: usize,
    pub dataset_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded config '{}' for pipeline '{}': {} parameters, {} datasets",
            self.path, self.pipeline, self.parameter_count, self.dataset_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            pipeline = self.pipeline,
            parameter_count = self.parameter_count,
            dataset_count = self.dataset_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config", span_name = name, path = self.path)
    }
}

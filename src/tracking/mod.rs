// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Experiment tracking sinks.

mod memory;

pub use memory::MemoryTracker;

use serde_json::Value;

use crate::observability::messages::session::MetricLogged;
use crate::observability::messages::StructuredLog;
use crate::traits::ExperimentTracker;

/// Writes every tracking call as a structured `tracing` event.
#[derive(Debug, Clone, Default)]
pub struct TracingTracker {
    experiment: Option<String>,
}

impl TracingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_experiment(experiment: impl Into<String>) -> Self {
        Self {
            experiment: Some(experiment.into()),
        }
    }

    fn experiment(&self) -> &str {
        self.experiment.as_deref().unwrap_or("default")
    }
}

impl ExperimentTracker for TracingTracker {
    fn start_run(&self, run: &str) {
        tracing::info!(experiment = self.experiment(), run, "Tracking run started");
    }

    fn log_param(&self, run: &str, key: &str, value: &Value) {
        tracing::info!(
            experiment = self.experiment(),
            run,
            param = key,
            value = %value,
            "Tracked parameter"
        );
    }

    fn log_metric(&self, run: &str, key: &str, value: f64, step: Option<u64>) {
        MetricLogged {
            run,
            key,
            value,
            step,
        }
        .log();
    }
}

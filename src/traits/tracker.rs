// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;

/// Sink for experiment-run metadata.
///
/// Apps report what they want recorded; the sink decides where it goes. A
/// run is opened with [`ExperimentTracker::start_run`] and every later call
/// refers to it by name.
pub trait ExperimentTracker: Send + Sync {
    fn start_run(&self, run: &str);

    fn log_param(&self, run: &str, key: &str, value: &Value);

    fn log_metric(&self, run: &str, key: &str, value: f64, step: Option<u64>);
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::traits::ExperimentTracker;

#[derive(Debug, Default)]
struct RunRecord {
    params: HashMap<String, Value>,
    metrics: HashMap<String, Vec<(f64, Option<u64>)>>,
}

/// Keeps everything it is told in memory, for tests and for apps that want
/// to inspect their own history.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    runs: Mutex<Vec<(String, RunRecord)>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run names in the order they were started.
    pub fn runs(&self) -> Vec<String> {
        self.with_runs(|runs| runs.iter().map(|(name, _)| name.clone()).collect())
    }

    /// Parameters of the most recent run called `run`.
    pub fn params(&self, run: &str) -> HashMap<String, Value> {
        self.with_runs(|runs| {
            latest(runs, run)
                .map(|record| record.params.clone())
                .unwrap_or_default()
        })
    }

    /// Every `(value, step)` recorded for `key` in the most recent run
    /// called `run`.
    pub fn metric_history(&self, run: &str, key: &str) -> Vec<(f64, Option<u64>)> {
        self.with_runs(|runs| {
            latest(runs, run)
                .and_then(|record| record.metrics.get(key).cloned())
                .unwrap_or_default()
        })
    }

    fn with_runs<T>(&self, f: impl FnOnce(&mut Vec<(String, RunRecord)>) -> T) -> T {
        let mut guard = match self.runs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Record for `run`, opening one implicitly if it was never started.
    fn record<T>(&self, run: &str, f: impl FnOnce(&mut RunRecord) -> T) -> T {
        self.with_runs(|runs| {
            let index = match runs.iter().rposition(|(name, _)| name == run) {
                Some(index) => index,
                None => {
                    runs.push((run.to_string(), RunRecord::default()));
                    runs.len() - 1
                }
            };
            f(&mut runs[index].1)
        })
    }
}

fn latest<'a>(runs: &'a [(String, RunRecord)], run: &str) -> Option<&'a RunRecord> {
    runs.iter()
        .rev()
        .find(|(name, _)| name == run)
        .map(|(_, record)| record)
}

impl ExperimentTracker for MemoryTracker {
    fn start_run(&self, run: &str) {
        self.with_runs(|runs| runs.push((run.to_string(), RunRecord::default())));
    }

    fn log_param(&self, run: &str, key: &str, value: &Value) {
        self.record(run, |record| {
            record.params.insert(key.to_string(), value.clone());
        });
    }

    fn log_metric(&self, run: &str, key: &str, value: f64, step: Option<u64>) {
        self.record(run, |record| {
            record
                .metrics
                .entry(key.to_string())
                .or_default()
                .push((value, step));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_per_run() {
        let tracker = MemoryTracker::new();
        tracker.start_run("estimate_pi");
        tracker.log_param("estimate_pi", "radius", &json!(1.0));
        tracker.log_metric("estimate_pi", "pi", 3.2, Some(10));
        tracker.log_metric("estimate_pi", "pi", 3.12, Some(100));

        assert_eq!(tracker.runs(), vec!["estimate_pi"]);
        assert_eq!(tracker.params("estimate_pi")["radius"], json!(1.0));
        assert_eq!(
            tracker.metric_history("estimate_pi", "pi"),
            vec![(3.2, Some(10)), (3.12, Some(100))]
        );
    }

    #[test]
    fn test_latest_run_wins() {
        let tracker = MemoryTracker::new();
        tracker.start_run("r");
        tracker.log_metric("r", "m", 1.0, None);
        tracker.start_run("r");
        tracker.log_metric("r", "m", 2.0, None);

        assert_eq!(tracker.runs(), vec!["r", "r"]);
        assert_eq!(tracker.metric_history("r", "m"), vec![(2.0, None)]);
    }

    #[test]
    fn test_implicit_run() {
        let tracker = MemoryTracker::new();
        tracker.log_metric("parent", "estimated_pi", 3.0, Some(4));

        assert_eq!(tracker.runs(), vec!["parent"]);
        assert!(tracker.params("parent").is_empty());
        assert!(tracker.metric_history("missing", "estimated_pi").is_empty());
    }
}

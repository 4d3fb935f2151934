// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde_json::Value;

/// In-memory data catalog.
///
/// Holds named datasets (seeded from configuration or saved by earlier runs)
/// and the configured parameters that apps leave internal.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    datasets: HashMap<String, Value>,
    parameters: HashMap<String, Value>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_datasets(mut self, datasets: HashMap<String, Value>) -> Self {
        self.datasets = datasets;
        self
    }

    pub fn load(&self, name: &str) -> Option<&Value> {
        self.datasets.get(name)
    }

    /// Store `value` under `name`, replacing any previous value.
    pub fn save(&mut self, name: impl Into<String>, value: Value) {
        self.datasets.insert(name.into(), value);
    }

    pub fn exists(&self, name: &str) -> bool {
        self.datasets.contains_key(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Dataset names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.datasets.keys().cloned().collect();
        names.sort();
        names
    }
}

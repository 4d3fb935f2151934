// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::app::AppPipelineSet;
use crate::errors::CompositionError;
use crate::observability::messages::registry::{PipelineRegistered, RegistryBuilt};
use crate::observability::messages::StructuredLog;
use crate::pipeline::Pipeline;
use crate::registry::{Registry, RegistryEntry};

/// Collects registry entries; [`RegistryBuilder::build`] checks them and
/// freezes the result.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<(String, RegistryEntry)>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_pipeline(self, identifier: impl Into<String>, pipeline: Pipeline) -> Self {
        self.register(identifier, RegistryEntry::Pipeline(pipeline))
    }

    pub fn register_apps(self, identifier: impl Into<String>, apps: AppPipelineSet) -> Self {
        self.register(identifier, RegistryEntry::Apps(apps))
    }

    pub fn register(mut self, identifier: impl Into<String>, entry: RegistryEntry) -> Self {
        self.entries.push((identifier.into(), entry));
        self
    }

    pub fn build(self) -> Result<Registry, CompositionError> {
        let mut entries = BTreeMap::new();
        for (identifier, entry) in self.entries {
            if entries.contains_key(&identifier) {
                return Err(CompositionError::DuplicatePipeline { identifier });
            }

            PipelineRegistered {
                identifier: &identifier,
                kind: entry.kind(),
                node_count: entry.pipeline().len(),
            }
            .log();
            entries.insert(identifier, entry);
        }

        let registry = Registry { entries };
        RegistryBuilt {
            entry_count: registry.len(),
        }
        .log();

        Ok(registry)
    }
}

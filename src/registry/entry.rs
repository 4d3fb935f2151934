// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::borrow::Cow;

use crate::app::{AppPipeline, AppPipelineSet};
use crate::pipeline::Pipeline;

/// What a registry identifier resolves to.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Pipeline(Pipeline),
    Apps(AppPipelineSet),
}

impl RegistryEntry {
    /// Every node of the entry as one pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        match self {
            RegistryEntry::Pipeline(pipeline) => pipeline,
            RegistryEntry::Apps(apps) => apps.pipeline(),
        }
    }

    /// App names callable through this entry. A plain pipeline exposes a
    /// single app named after the entry identifier.
    pub fn app_names(&self, identifier: &str) -> Vec<String> {
        match self {
            RegistryEntry::Pipeline(_) => vec![identifier.to_string()],
            RegistryEntry::Apps(apps) => apps.names().map(str::to_string).collect(),
        }
    }

    /// Resolve `app` inside the entry registered as `identifier`.
    pub fn app(&self, identifier: &str, app: &str) -> Option<Cow<'_, AppPipeline>> {
        match self {
            RegistryEntry::Pipeline(pipeline) if app == identifier => Some(Cow::Owned(
                AppPipeline::from_pipeline(identifier, pipeline.clone()),
            )),
            RegistryEntry::Pipeline(_) => None,
            RegistryEntry::Apps(apps) => apps.get(app).map(Cow::Borrowed),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RegistryEntry::Pipeline(_) => "pipeline",
            RegistryEntry::Apps(_) => "apps",
        }
    }
}

impl From<Pipeline> for RegistryEntry {
    fn from(pipeline: Pipeline) -> Self {
        RegistryEntry::Pipeline(pipeline)
    }
}

impl From<AppPipelineSet> for RegistryEntry {
    fn from(apps: AppPipelineSet) -> Self {
        RegistryEntry::Apps(apps)
    }
}

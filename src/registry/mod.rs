// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The pipeline registry: identifier -> pipeline or app set.
//!
//! A registry is assembled once by a [`RegistryBuilder`] and is read-only
//! afterwards. Sessions receive it as an `Arc<Registry>`.
//!
//! ```
//! use pipeline_boot::registry::Registry;
//! use pipeline_boot::pipeline::{Node, Pipeline};
//! use pipeline_boot::traits::{NodeArgs, NodeOutputs};
//! use pipeline_boot::errors::NodeError;
//!
//! fn noop(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
//!     Ok(NodeOutputs::new())
//! }
//!
//! let p = Pipeline::new(vec![Node::new("n", noop).with_outputs(["x"])]).unwrap();
//! let registry = Registry::builder()
//!     .register_pipeline("__default__", p)
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.get("__default__").is_ok());
//! assert!(registry.get("missing").is_err());
//! ```

mod builder;
mod entry;


pub use builder::RegistryBuilder;
pub use entry::RegistryEntry;

use std::collections::BTreeMap;

use crate::errors::SessionError;
use crate::observability::messages::registry::UnknownPipelineRequested;
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, identifier: &str) -> Result<&RegistryEntry, SessionError> {
        self.entries.get(identifier).ok_or_else(|| {
            UnknownPipelineRequested { identifier }.log();
            SessionError::UnknownPipeline {
                identifier: identifier.to_string(),
                available: self.identifiers().map(str::to_string).collect(),
            }
        })
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegistryEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

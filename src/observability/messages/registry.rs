// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for registry assembly and lookups.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// An entry was added to the registry being built.
///
/// # Log Level
/// `debug!` - Startup detail
pub struct PipelineRegistered<'a> {
    pub identifier: &'a str,
    pub kind: &'a str,
    pub node_count: usize,
}

impl Display for PipelineRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered {} entry '{}' ({} nodes)",
            self.kind, self.identifier, self.node_count
        )
    }
}

impl StructuredLog for PipelineRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            identifier = self.identifier,
            kind = self.kind,
            node_count = self.node_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "registry_entry",
            span_name = name,
            identifier = self.identifier,
            kind = self.kind,
        )
    }
}

/// The registry was frozen.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeline_boot::observability::messages::registry::RegistryBuilt;
///
/// let msg = RegistryBuilt { entry_count: 8 };
/// assert_eq!(msg.to_string(), "Pipeline registry built with 8 entries");
/// ```
pub struct RegistryBuilt {
    pub entry_count: usize,
}

impl Display for RegistryBuilt {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pipeline registry built with {} entries", self.entry_count)
    }
}

impl StructuredLog for RegistryBuilt {
    fn log(&self) {
        tracing::info!(entry_count = self.entry_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("registry", span_name = name, entry_count = self.entry_count)
    }
}

/// A lookup missed the registry.
///
/// # Log Level
/// `warn!` - Caller error, recoverable
pub struct UnknownPipelineRequested<'a> {
    pub identifier: &'a str,
}

impl Display for UnknownPipelineRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unknown pipeline requested: '{}'", self.identifier)
    }
}

impl StructuredLog for UnknownPipelineRequested<'_> {
    fn log(&self) {
        tracing::warn!(identifier = self.identifier, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("registry_lookup", span_name = name, identifier = self.identifier)
    }
}

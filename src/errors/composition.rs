// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while composing pipelines, app pipelines and the registry.
//!
//! Every variant is fatal at the point of detection. Registry assembly stops at
//! the first one, so a partially-built registry is never observable.

use thiserror::Error;

use crate::pipeline::SlotKind;

/// Errors that can occur while building or transforming a pipeline graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Two nodes in the same set share a name.
    #[error("Duplicate node name: '{node}'")]
    DuplicateNode { node: String },

    /// The dependency edges form a cycle. `cycle` lists node names and repeats
    /// the first one at the end.
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    Cycle { cycle: Vec<String> },

    /// A filter referenced node names absent from the source pipeline.
    #[error("Unknown node(s) in {context}: {}", nodes.join(", "))]
    UnknownNode { nodes: Vec<String>, context: String },

    /// A namespace override or app contract entry references a slot that does
    /// not exist after prior transforms.
    #[error("Unresolved {kind} '{slot}' in {context}")]
    UnresolvedSlot {
        kind: SlotKind,
        slot: String,
        context: String,
    },

    /// Two nodes produce the same dataset.
    #[error("Output '{output}' is produced by both '{first}' and '{second}'")]
    OutputNotUnique {
        output: String,
        first: String,
        second: String,
    },

    /// A node declaration is malformed (empty name, slot declared as both an
    /// input and a parameter, and so on).
    #[error("Invalid node '{node}': {reason}")]
    InvalidNode { node: String, reason: String },

    /// An app contract maps the same internal slot more than once.
    #[error("App pipeline '{app}' declares '{slot}' more than once in its contract")]
    ConflictingContract { app: String, slot: String },

    /// Two app pipelines in one set share a name.
    #[error("Duplicate app pipeline name: '{name}'")]
    DuplicateApp { name: String },

    /// Two registry entries share an identifier.
    #[error("Duplicate registry identifier: '{identifier}'")]
    DuplicatePipeline { identifier: String },
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Invocation-time errors.
//!
//! Each variant names the pipeline identifier and, where relevant, the slot or
//! node involved, so a caller can diagnose the failure without looking inside
//! the resolved graph.

use thiserror::Error;

use crate::errors::NodeError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A lookup by identifier missed in the registry.
    #[error("Unknown pipeline '{identifier}' (available: {})", available.join(", "))]
    UnknownPipeline {
        identifier: String,
        available: Vec<String>,
    },

    /// The caller omitted an input the contract requires, or a dataset the
    /// pipeline needs is absent from the catalog.
    #[error("Pipeline '{pipeline}' is missing input '{input}'")]
    MissingInput { pipeline: String, input: String },

    /// A declared artifact is absent from the catalog.
    #[error("Pipeline '{pipeline}' is missing artifact '{artifact}'")]
    MissingArtifact { pipeline: String, artifact: String },

    /// The caller omitted a parameter the contract requires, or a parameter
    /// the pipeline needs is absent from the configuration.
    #[error("Pipeline '{pipeline}' is missing parameter '{parameter}'")]
    MissingParameter { pipeline: String, parameter: String },

    /// The caller supplied an input outside the declared contract.
    #[error("Pipeline '{pipeline}' does not expose input '{input}'")]
    UnexpectedInput { pipeline: String, input: String },

    /// The caller supplied a parameter outside the declared contract.
    #[error("Pipeline '{pipeline}' does not expose parameter '{parameter}'")]
    UnexpectedParameter { pipeline: String, parameter: String },

    /// A node function returned an error.
    #[error("Node '{node}' in pipeline '{pipeline}' failed: {source}")]
    NodeFailed {
        pipeline: String,
        node: String,
        #[source]
        source: NodeError,
    },

    /// A node function did not return one of its declared outputs.
    #[error("Node '{node}' in pipeline '{pipeline}' did not produce output '{output}'")]
    MissingOutput {
        pipeline: String,
        node: String,
        output: String,
    },

    #[error("Internal session error: {message}")]
    Internal { message: String },
}

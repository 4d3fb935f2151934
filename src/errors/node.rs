// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors returned by node functions.
///
/// The composition core never produces these; they come from user callables
/// and are wrapped into [`crate::errors::SessionError::NodeFailed`] by the
/// session that invoked the node.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NodeError {
    #[error("missing argument '{name}'")]
    MissingArgument { name: String },

    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

impl NodeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::NodeError;

/// Values returned by a node function, keyed by the node's local output names.
pub type NodeOutputs = HashMap<String, Value>;

/// Arguments handed to a node function, keyed by the node's local slot names.
#[derive(Debug, Clone, Default)]
pub struct NodeArgs {
    inputs: HashMap<String, Value>,
    parameters: HashMap<String, Value>,
}

impl NodeArgs {
    pub fn new(inputs: HashMap<String, Value>, parameters: HashMap<String, Value>) -> Self {
        Self { inputs, parameters }
    }

    pub fn input(&self, name: &str) -> Result<&Value, NodeError> {
        self.inputs.get(name).ok_or_else(|| NodeError::MissingArgument {
            name: name.to_string(),
        })
    }

    pub fn parameter(&self, name: &str) -> Result<&Value, NodeError> {
        self.parameters
            .get(name)
            .ok_or_else(|| NodeError::MissingArgument {
                name: name.to_string(),
            })
    }

    /// Deserialize an input into `T`.
    pub fn input_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, NodeError> {
        decode(name, self.input(name)?)
    }

    /// Deserialize a parameter into `T`.
    pub fn parameter_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, NodeError> {
        decode(name, self.parameter(name)?)
    }
}

fn decode<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, NodeError> {
    serde_json::from_value(value.clone()).map_err(|e| NodeError::InvalidArgument {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// The opaque callable behind a node.
///
/// The composition core only reads a node's declared slot names; it never
/// calls this. Execution sessions do.
pub trait NodeFunction: Send + Sync {
    fn call(&self, args: &NodeArgs) -> Result<NodeOutputs, NodeError>;
}

impl<F> NodeFunction for F
where
    F: Fn(&NodeArgs) -> Result<NodeOutputs, NodeError> + Send + Sync,
{
    fn call(&self, args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        self(args)
    }
}

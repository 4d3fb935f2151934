// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SessionError;

/// Runs app pipelines by name.
///
/// A session is booted on one registry entry. `run` resolves `identifier` to
/// an app pipeline inside that entry, binds the caller's inputs and
/// parameters through the app contract, executes the pipeline, and returns
/// the declared outputs keyed by their external names.
#[async_trait]
pub trait Session: Send + Sync {
    async fn run(
        &self,
        identifier: &str,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, SessionError>;

    /// Names accepted by [`Session::run`].
    fn app_names(&self) -> Vec<String>;
}

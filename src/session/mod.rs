// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reference execution session and data catalog.

mod catalog;
mod local;

pub use catalog::MemoryCatalog;
pub use local::LocalSession;

use serde::Deserialize;

/// Runtime knobs for a [`LocalSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionOptions {
    /// Upper bound on nodes running at the same time.
    pub max_concurrency: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_concurrency: default_concurrency(),
        }
    }
}

/// Available parallelism, or 4 when it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod composition;
mod config;
mod node;
mod session;

pub use composition::CompositionError;
pub use config::ConfigError;
pub use node::NodeError;
pub use session::SessionError;

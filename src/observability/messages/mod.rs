// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields.
//!
//! # Organization
//!
//! * `composition` - pipeline assembly, namespacing and app contracts
//! * `registry` - registry assembly and lookups
//! * `session` - session boot, runs, node execution and tracking
//!
//! # Usage Pattern
//!
//! ```rust
//! use pipeline_boot::observability::messages::session::RunStarted;
//! use pipeline_boot::observability::messages::StructuredLog;
//!
//! let msg = RunStarted {
//!     pipeline: "estimate_pi",
//!     node_count: 2,
//!     level_count: 2,
//! };
//!
//! tracing::info!("{}", msg);
//! msg.log();
//! ```

use tracing::Span;

pub mod composition;
pub mod registry;
pub mod session;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message as a tracing event at its documented level.
    fn log(&self);

    /// Build a span carrying the message fields.
    fn span(&self, name: &str) -> Span;
}

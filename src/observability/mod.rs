// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log lines are not written inline. Every event is a message struct under
//! [`messages`] with a `Display` implementation, so wording lives in one place
//! and the same struct can emit a structured `tracing` event or open a span.
//!
//! # Usage
//!
//! ```rust
//! use pipeline_boot::observability::messages::registry::RegistryBuilt;
//! use pipeline_boot::observability::messages::StructuredLog;
//!
//! RegistryBuilt { entry_count: 3 }.log();
//! ```
//!
//! Subscribers are installed by the binary (`tracing-subscriber` with an
//! `EnvFilter`); the library only emits events.

pub mod messages;

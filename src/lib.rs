// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod app;            // app pipelines and their contracts
pub mod apps;           // bundled projects
pub mod config;         // session configuration
pub mod errors;         // error handling
pub mod observability;
pub mod pipeline;       // nodes, pipelines, namespaces
pub mod registry;       // identifier -> pipeline or app set
pub mod session;        // execution session and catalog
pub mod tracking;       // experiment tracking sinks
pub mod traits;         // unified abstractions

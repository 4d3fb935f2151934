// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod node_function;
pub mod session;
pub mod tracker;

pub use node_function::{NodeArgs, NodeFunction, NodeOutputs};
pub use session::Session;
pub use tracker::ExperimentTracker;

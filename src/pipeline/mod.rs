// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Nodes, pipelines, and the algebra over them.

mod dependency_graph;
mod graph;
mod modular;
mod namespace;
mod node;
mod slot;
mod validation;

pub use dependency_graph::DependencyGraph;
pub use graph::Pipeline;
pub use modular::{pipeline, ModularPipeline};
pub use namespace::Namespace;
pub use node::Node;
pub use slot::{SlotBinding, SlotKind, SlotMapping};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! App pipelines: pipelines wrapped with the contract a session exposes to
//! its callers.
//!
//! A contract maps external names to internal slots in four groups:
//!
//! * `inputs` - supplied by the caller on each run
//! * `parameters` - supplied by the caller on each run
//! * `artifacts` - read from the data catalog (for example a model trained by
//!   another app)
//! * `outputs` - returned to the caller
//!
//! Anything not mentioned stays internal: free inputs are loaded from the
//! catalog, parameters come from configuration, and outputs are saved to the
//! catalog.

mod app_pipeline;
mod app_set;
mod contract;

pub use app_pipeline::{app_pipeline, AppPipeline, AppPipelineBuilder};
pub use app_set::AppPipelineSet;
pub use contract::AppContract;

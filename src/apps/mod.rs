// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bundled projects and the registry that exposes them.

pub mod monte_carlo;
pub mod spaceflights;

use crate::config::consts::DEFAULT_PIPELINE;
use crate::errors::CompositionError;
use crate::registry::Registry;

/// Every bundled pipeline, keyed the way sessions and configs refer to them.
///
/// | identifier        | entry                                         |
/// |-------------------|-----------------------------------------------|
/// | `__default__`     | spaceflights apps: `inference`, `evaluation`  |
/// | `spaceflights`    | same as `__default__`                         |
/// | `monte_carlo`     | apps: `simulate_distance`, `estimate_pi`      |
/// | `data_processing` | raw tables into `features_store`              |
/// | `data_science`    | training, inference and evaluation combined   |
/// | `training`        | plain pipeline                                |
/// | `inference`       | plain pipeline                                |
/// | `evaluation`      | plain pipeline                                |
pub fn register_pipelines() -> Result<Registry, CompositionError> {
    let spaceflights_apps = spaceflights::create_app_pipelines()?;
    let monte_carlo_apps =
        monte_carlo::create_app_pipelines(&monte_carlo::create_pipeline()?)?;

    Registry::builder()
        .register_apps(DEFAULT_PIPELINE, spaceflights_apps.clone())
        .register_apps("spaceflights", spaceflights_apps)
        .register_apps("monte_carlo", monte_carlo_apps)
        .register_pipeline(
            "data_processing",
            spaceflights::data_processing::create_pipeline()?,
        )
        .register_pipeline("data_science", spaceflights::data_science_pipeline()?)
        .register_pipeline(spaceflights::TRAINING, spaceflights::training_pipeline()?)
        .register_pipeline(spaceflights::INFERENCE, spaceflights::inference_pipeline()?)
        .register_pipeline(spaceflights::EVALUATION, spaceflights::evaluation_pipeline()?)
        .build()
}

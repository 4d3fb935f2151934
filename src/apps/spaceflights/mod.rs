// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shuttle price prediction.
//!
//! `training`, `inference` and `evaluation` reuse the same data science
//! nodes under their own namespaces. Inference and evaluation read the
//! regressor the training namespace produced.

pub mod data_processing;
pub mod data_science;

use crate::app::{app_pipeline, AppPipeline, AppPipelineSet};
use crate::errors::CompositionError;
use crate::pipeline::{pipeline, Pipeline};

use data_science::{
    evaluation_nodes, feature_nodes, model_input_nodes, model_training_nodes, prediction_nodes,
};

pub const TRAINING: &str = "training";
pub const INFERENCE: &str = "inference";
pub const EVALUATION: &str = "evaluation";

/// Regressor dataset as produced by the training namespace.
pub const TRAINED_REGRESSOR: &str = "training.regressor";

pub fn training_pipeline() -> Result<Pipeline, CompositionError> {
    pipeline([
        model_input_nodes()?,
        model_training_nodes()?,
        pipeline([prediction_nodes()?])
            .inputs([("features", "X_test")])
            .build()?,
        pipeline([evaluation_nodes()?])
            .inputs([("labels", "y_test")])
            .build()?,
    ])
    .inputs("features_store")
    .namespace(TRAINING)
    .build()
}

pub fn inference_pipeline() -> Result<Pipeline, CompositionError> {
    pipeline([feature_nodes()?, prediction_nodes()?])
        .inputs([
            ("features_store", "features_store"),
            ("regressor", TRAINED_REGRESSOR),
        ])
        .namespace(INFERENCE)
        .build()
}

pub fn evaluation_pipeline() -> Result<Pipeline, CompositionError> {
    pipeline([model_input_nodes()?, prediction_nodes()?, evaluation_nodes()?])
        .inputs([
            ("features_store", "features_store"),
            ("regressor", TRAINED_REGRESSOR),
        ])
        .namespace(EVALUATION)
        .build()
}

/// Training + inference + evaluation as one plain pipeline.
pub fn data_science_pipeline() -> Result<Pipeline, CompositionError> {
    Pipeline::concatenate([
        &training_pipeline()?,
        &inference_pipeline()?,
        &evaluation_pipeline()?,
    ])
}

/// Inference takes a shuttle table and returns its predicted prices; the
/// regressor is an artifact left in the catalog by a training run.
pub fn inference_app() -> Result<AppPipeline, CompositionError> {
    app_pipeline(inference_pipeline()?, INFERENCE)
        .inputs("features_store")
        .artifacts(TRAINED_REGRESSOR)
        .outputs("inference.predictions")
        .build()
}

/// Evaluation reads everything from the catalog.
pub fn evaluation_app() -> Result<AppPipeline, CompositionError> {
    app_pipeline(evaluation_pipeline()?, EVALUATION).build()
}

pub fn training_app() -> Result<AppPipeline, CompositionError> {
    app_pipeline(training_pipeline()?, TRAINING)
        .inputs("features_store")
        .outputs("training.regression_score")
        .build()
}

pub fn create_app_pipelines() -> Result<AppPipelineSet, CompositionError> {
    AppPipelineSet::new([inference_app()?, evaluation_app()?])
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Monte-Carlo estimation of pi.
//!
//! `simulate_distance` draws one point uniformly in the square `[-r, r]²`
//! and returns its distance to the origin; `estimate_pi` turns a batch of
//! distances into `4 * inside / total`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::{app_pipeline, AppPipelineSet};
use crate::errors::{CompositionError, ConfigError, NodeError, SessionError};
use crate::pipeline::{Node, Pipeline};
use crate::traits::{ExperimentTracker, NodeArgs, NodeFunction, NodeOutputs, Session};

pub const SIMULATE_DISTANCE: &str = "simulate_distance";
pub const ESTIMATE_PI: &str = "estimate_pi";

/// Node function behind `simulate_distance`. Owns its generator so a
/// seeded pipeline replays the same points.
struct DistanceSimulator {
    rng: Mutex<StdRng>,
}

impl DistanceSimulator {
    fn new(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl NodeFunction for DistanceSimulator {
    fn call(&self, args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        let radius: f64 = args.parameter_as("radius")?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(NodeError::InvalidArgument {
                name: "radius".to_string(),
                reason: format!("must be a positive number, got {}", radius),
            });
        }

        let (x, y) = {
            let mut rng = match self.rng.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            (
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
            )
        };

        Ok(HashMap::from([(
            "distance".to_string(),
            json!((x * x + y * y).sqrt()),
        )]))
    }
}

fn estimate_pi(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let distances: Vec<f64> = args.input_as("distances")?;
    let num_samples: u64 = args.parameter_as("num_samples")?;
    let radius: f64 = args.parameter_as("radius")?;

    if num_samples == 0 {
        return Err(NodeError::InvalidArgument {
            name: "num_samples".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let inside = distances.iter().filter(|d| **d <= radius).count() as f64;
    Ok(HashMap::from([(
        "pi".to_string(),
        json!(4.0 * inside / num_samples as f64),
    )]))
}

pub fn create_pipeline() -> Result<Pipeline, CompositionError> {
    build_pipeline(StdRng::from_os_rng())
}

/// Same nodes, with `simulate_distance` drawing from a seeded generator.
pub fn create_pipeline_with_seed(seed: u64) -> Result<Pipeline, CompositionError> {
    build_pipeline(StdRng::seed_from_u64(seed))
}

fn build_pipeline(rng: StdRng) -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![
        Node::new(SIMULATE_DISTANCE, DistanceSimulator::new(rng))
            .with_outputs(["distance"])
            .with_parameters(["radius"])
            .with_tags(["monte_carlo"]),
        Node::new(ESTIMATE_PI, estimate_pi)
            .with_inputs(["distances"])
            .with_outputs(["pi"])
            .with_parameters(["num_samples", "radius"])
            .with_tags(["monte_carlo"]),
    ])
}

/// `simulate_distance` and `estimate_pi` as callable apps.
pub fn create_app_pipelines(pipeline: &Pipeline) -> Result<AppPipelineSet, CompositionError> {
    let simulate = app_pipeline(pipeline.only_nodes([SIMULATE_DISTANCE])?, SIMULATE_DISTANCE)
        .parameters("radius")
        .outputs("distance")
        .build()?;
    let estimate = app_pipeline(pipeline.only_nodes([ESTIMATE_PI])?, ESTIMATE_PI)
        .inputs("distances")
        .parameters(["num_samples", "radius"])
        .outputs("pi")
        .build()?;

    simulate + estimate
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SampleRange {
    pub start: u64,
    pub stop: u64,
    pub step: u64,
}

/// Settings for [`MonteCarloApp`], read from the session parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonteCarloParams {
    pub sample_range: SampleRange,
    pub radius: f64,
}

impl MonteCarloParams {
    pub fn from_parameters(parameters: &HashMap<String, Value>) -> Result<Self, ConfigError> {
        let object: serde_json::Map<String, Value> = parameters
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let params: Self =
            serde_json::from_value(Value::Object(object)).map_err(|e| ConfigError::Invalid {
                message: format!("monte carlo parameters: {}", e),
            })?;

        let range = params.sample_range;
        if range.step == 0 || range.start == 0 || range.start >= range.stop {
            return Err(ConfigError::Invalid {
                message: format!(
                    "monte carlo sample_range must satisfy 0 < start < stop and step > 0, got {}..{} by {}",
                    range.start, range.stop, range.step
                ),
            });
        }
        if params.radius <= 0.0 {
            return Err(ConfigError::Invalid {
                message: "monte carlo radius must be positive".to_string(),
            });
        }

        Ok(params)
    }

    pub fn sample_counts(&self) -> impl Iterator<Item = u64> {
        let range = self.sample_range;
        (range.start..range.stop).step_by(range.step as usize)
    }
}

/// Drives the two Monte-Carlo apps through a session: for every sample
/// count, simulate that many distances, estimate pi from them, and log the
/// estimate as the `estimated_pi` metric at that step.
pub struct MonteCarloApp {
    params: MonteCarloParams,
    tracker: Arc<dyn ExperimentTracker>,
}

impl MonteCarloApp {
    pub const RUN_NAME: &'static str = "monte_carlo";

    pub fn new(params: MonteCarloParams, tracker: Arc<dyn ExperimentTracker>) -> Self {
        Self { params, tracker }
    }

    /// Returns `(num_samples, estimated_pi)` per step.
    pub async fn run(&self, session: &dyn Session) -> Result<Vec<(u64, f64)>, SessionError> {
        let radius = json!(self.params.radius);
        let mut estimates = Vec::new();

        self.tracker.start_run(Self::RUN_NAME);
        self.tracker.log_param(Self::RUN_NAME, "radius", &radius);

        for num_samples in self.params.sample_counts() {
            let mut distances = Vec::with_capacity(num_samples as usize);
            for _ in 0..num_samples {
                let mut result = session
                    .run(
                        SIMULATE_DISTANCE,
                        HashMap::new(),
                        HashMap::from([("radius".to_string(), radius.clone())]),
                    )
                    .await?;
                distances.push(take_output(&mut result, SIMULATE_DISTANCE, "distance")?);
            }

            let mut result = session
                .run(
                    ESTIMATE_PI,
                    HashMap::from([("distances".to_string(), Value::Array(distances))]),
                    HashMap::from([
                        ("num_samples".to_string(), json!(num_samples)),
                        ("radius".to_string(), radius.clone()),
                    ]),
                )
                .await?;
            let estimated = take_output(&mut result, ESTIMATE_PI, "pi")?;
            let estimated = estimated.as_f64().ok_or_else(|| SessionError::Internal {
                message: format!("'{}' returned a non-numeric pi: {}", ESTIMATE_PI, estimated),
            })?;

            self.tracker
                .log_metric(Self::RUN_NAME, "estimated_pi", estimated, Some(num_samples));
            estimates.push((num_samples, estimated));
        }

        Ok(estimates)
    }
}

fn take_output(
    result: &mut HashMap<String, Value>,
    pipeline: &str,
    output: &str,
) -> Result<Value, SessionError> {
    result.remove(output).ok_or_else(|| SessionError::Internal {
        message: format!("app '{}' did not return '{}'", pipeline, output),
    })
}

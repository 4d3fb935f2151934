// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::app::AppPipeline;
use crate::errors::SessionError;
use crate::observability::messages::session::{
    NodeExecuted, NodeSkipped, RunCompleted, RunFailed, RunStarted, SessionStarted,
};
use crate::observability::messages::StructuredLog;
use crate::pipeline::Node;
use crate::registry::Registry;
use crate::session::{MemoryCatalog, SessionOptions};
use crate::traits::{ExperimentTracker, NodeArgs, NodeOutputs, Session};

/// In-process session over one registry entry.
///
/// Nodes run level by level in dependency order. Nodes of the same level
/// run concurrently on the blocking pool, at most `max_concurrency` at a
/// time. The first failure ends the run: nodes of that level still waiting
/// for a permit are skipped, later levels never start, and siblings already
/// running on the blocking pool finish detached with their outputs dropped.
///
/// Datasets the caller does not receive back are saved to the session's
/// [`MemoryCatalog`], so a later run of another app in the same session can
/// read them as artifacts.
pub struct LocalSession {
    registry: Arc<Registry>,
    entry: String,
    options: SessionOptions,
    catalog: RwLock<MemoryCatalog>,
    tracker: Option<Arc<dyn ExperimentTracker>>,
}

struct NodeRun {
    node: Node,
    outputs: NodeOutputs,
    duration: Duration,
}

impl LocalSession {
    pub fn new(registry: Arc<Registry>, entry: impl Into<String>) -> Result<Self, SessionError> {
        Self::with_options(registry, entry, SessionOptions::default())
    }

    pub fn with_options(
        registry: Arc<Registry>,
        entry: impl Into<String>,
        options: SessionOptions,
    ) -> Result<Self, SessionError> {
        let entry = entry.into();
        let app_count = registry.get(&entry)?.app_names(&entry).len();
        let options = SessionOptions {
            max_concurrency: options.max_concurrency.max(1),
        };

        SessionStarted {
            entry: &entry,
            app_count,
            max_concurrency: options.max_concurrency,
        }
        .log();

        Ok(Self {
            registry,
            entry,
            options,
            catalog: RwLock::new(MemoryCatalog::new()),
            tracker: None,
        })
    }

    pub fn with_catalog(mut self, catalog: MemoryCatalog) -> Self {
        self.catalog = RwLock::new(catalog);
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn ExperimentTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Current value of a catalog dataset.
    pub async fn dataset(&self, name: &str) -> Option<Value> {
        self.catalog.read().await.load(name).cloned()
    }

    /// Snapshot of the catalog.
    pub async fn catalog(&self) -> MemoryCatalog {
        self.catalog.read().await.clone()
    }

    fn resolve(&self, identifier: &str) -> Result<AppPipeline, SessionError> {
        let entry = self.registry.get(&self.entry)?;
        entry
            .app(&self.entry, identifier)
            .map(|app| app.into_owned())
            .ok_or_else(|| SessionError::UnknownPipeline {
                identifier: identifier.to_string(),
                available: entry.app_names(&self.entry),
            })
    }

    /// Bind caller values, artifacts and configuration to internal names.
    async fn bind(
        &self,
        app: &AppPipeline,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> Result<(HashMap<String, Value>, HashMap<String, Value>), SessionError> {
        let pipeline = app.name().to_string();

        if let Some(input) = inputs.keys().find(|k| !app.inputs().contains_key(k.as_str())) {
            return Err(SessionError::UnexpectedInput {
                pipeline,
                input: input.clone(),
            });
        }
        if let Some(parameter) = parameters.keys().find(|k| !app.parameters().contains_key(k.as_str())) {
            return Err(SessionError::UnexpectedParameter {
                pipeline,
                parameter: parameter.clone(),
            });
        }

        let catalog = self.catalog.read().await;

        let mut datasets = HashMap::new();
        for (external, internal) in app.inputs().iter() {
            let value = inputs
                .get(external)
                .ok_or_else(|| SessionError::MissingInput {
                    pipeline: pipeline.clone(),
                    input: external.to_string(),
                })?;
            datasets.insert(internal.to_string(), value.clone());
        }
        for (external, internal) in app.artifacts().iter() {
            let value = catalog
                .load(internal)
                .ok_or_else(|| SessionError::MissingArtifact {
                    pipeline: pipeline.clone(),
                    artifact: external.to_string(),
                })?;
            datasets.insert(internal.to_string(), value.clone());
        }
        for input in app.catalog_inputs() {
            if datasets.contains_key(&input) {
                continue;
            }
            let value = catalog
                .load(&input)
                .ok_or_else(|| SessionError::MissingInput {
                    pipeline: pipeline.clone(),
                    input: input.clone(),
                })?;
            datasets.insert(input, value.clone());
        }

        let mut bound_parameters = HashMap::new();
        for (external, internal) in app.parameters().iter() {
            let value = parameters
                .get(external)
                .ok_or_else(|| SessionError::MissingParameter {
                    pipeline: pipeline.clone(),
                    parameter: external.to_string(),
                })?;
            bound_parameters.insert(internal.to_string(), value.clone());
        }
        for parameter in app.catalog_parameters() {
            let value = catalog
                .parameter(&parameter)
                .ok_or_else(|| SessionError::MissingParameter {
                    pipeline: pipeline.clone(),
                    parameter: parameter.clone(),
                })?;
            bound_parameters.insert(parameter, value.clone());
        }

        Ok((datasets, bound_parameters))
    }

    async fn execute(
        &self,
        app: &AppPipeline,
        mut datasets: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, SessionError> {
        let pipeline = app.name();
        let levels = app.pipeline().topological_levels();
        let semaphore = Arc::new(Semaphore::new(self.options.max_concurrency));

        let run_started = RunStarted {
            pipeline,
            node_count: app.pipeline().len(),
            level_count: levels.len(),
        };
        run_started.log();
        let run_span = run_started.span("execute");

        for level in levels {
            let failed = CancellationToken::new();
            let mut tasks = Vec::with_capacity(level.len());
            for node in level {
                let args = node_arguments(pipeline, node, &datasets, &parameters)?;
                let permit = Arc::clone(&semaphore).acquire_owned().await.map_err(|e| {
                    SessionError::Internal {
                        message: format!(
                            "Failed to acquire semaphore permit for node '{}': {}",
                            node.name(),
                            e
                        ),
                    }
                })?;
                if failed.is_cancelled() {
                    break;
                }

                let node = node.clone();
                let pipeline = pipeline.to_string();
                let span = run_span.clone();
                let failed = failed.clone();
                tasks.push(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let _entered = span.enter();
                    if failed.is_cancelled() {
                        NodeSkipped {
                            pipeline: &pipeline,
                            node: node.name(),
                        }
                        .log();
                        return Ok(None);
                    }

                    let started = Instant::now();
                    match node.func().call(&args) {
                        Ok(outputs) => Ok(Some(NodeRun {
                            node,
                            outputs,
                            duration: started.elapsed(),
                        })),
                        Err(source) => {
                            failed.cancel();
                            Err(SessionError::NodeFailed {
                                pipeline,
                                node: node.name().to_string(),
                                source,
                            })
                        }
                    }
                }));
            }

            for handle in tasks {
                let run = match handle.await {
                    Ok(Ok(Some(run))) => run,
                    Ok(Ok(None)) => continue,
                    Ok(Err(e)) => {
                        failed.cancel();
                        return Err(e);
                    }
                    Err(join_error) => {
                        failed.cancel();
                        return Err(SessionError::Internal {
                            message: format!("Task join error: {}", join_error),
                        });
                    }
                };
                if let Err(e) = store_outputs(pipeline, run, &mut datasets) {
                    failed.cancel();
                    return Err(e);
                }
            }
        }

        let mut returned = HashMap::new();
        for (external, internal) in app.outputs().iter() {
            if let Some(value) = datasets.get(internal) {
                returned.insert(external.to_string(), value.clone());
            }
        }

        let exposed: BTreeSet<&str> = app.outputs().values().collect();
        let mut catalog = self.catalog.write().await;
        for produced in app.pipeline().all_outputs() {
            if exposed.contains(produced.as_str()) {
                continue;
            }
            if let Some(value) = datasets.remove(&produced) {
                catalog.save(produced, value);
            }
        }

        Ok(returned)
    }

    fn track(&self, identifier: &str, parameters: &HashMap<String, Value>, outputs: &HashMap<String, Value>) {
        let Some(tracker) = &self.tracker else {
            return;
        };
        tracker.start_run(identifier);
        for (key, value) in parameters {
            tracker.log_param(identifier, key, value);
        }
        for (key, value) in outputs {
            if let Some(number) = value.as_f64() {
                tracker.log_metric(identifier, key, number, None);
            }
        }
    }
}

/// Arguments for one node, keyed by the node's local slot names.
fn node_arguments(
    pipeline: &str,
    node: &Node,
    datasets: &HashMap<String, Value>,
    parameters: &HashMap<String, Value>,
) -> Result<NodeArgs, SessionError> {
    let missing = |dataset: &str| SessionError::Internal {
        message: format!(
            "dataset '{}' for node '{}' in pipeline '{}' was never bound",
            dataset,
            node.name(),
            pipeline
        ),
    };

    let mut inputs = HashMap::new();
    for slot in node.input_bindings() {
        let value = datasets.get(&slot.dataset).ok_or_else(|| missing(&slot.dataset))?;
        inputs.insert(slot.local.clone(), value.clone());
    }

    let mut bound = HashMap::new();
    for slot in node.parameter_bindings() {
        let value = parameters
            .get(&slot.dataset)
            .ok_or_else(|| missing(&slot.dataset))?;
        bound.insert(slot.local.clone(), value.clone());
    }

    Ok(NodeArgs::new(inputs, bound))
}

/// Move a node's declared outputs into the dataset map under their graph names.
fn store_outputs(
    pipeline: &str,
    run: NodeRun,
    datasets: &mut HashMap<String, Value>,
) -> Result<(), SessionError> {
    let NodeRun {
        node,
        mut outputs,
        duration,
    } = run;

    for slot in node.output_bindings() {
        let value = outputs
            .remove(&slot.local)
            .ok_or_else(|| SessionError::MissingOutput {
                pipeline: pipeline.to_string(),
                node: node.name().to_string(),
                output: slot.local.clone(),
            })?;
        datasets.insert(slot.dataset.clone(), value);
    }
    if !outputs.is_empty() {
        tracing::debug!(
            node = node.name(),
            ignored = ?outputs.keys().collect::<Vec<_>>(),
            "node returned undeclared outputs"
        );
    }

    NodeExecuted {
        pipeline,
        node: node.name(),
        output_count: node.output_bindings().len(),
        duration,
    }
    .log();

    Ok(())
}

#[async_trait]
impl Session for LocalSession {
    async fn run(
        &self,
        identifier: &str,
        inputs: HashMap<String, Value>,
        parameters: HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, SessionError> {
        let app = self.resolve(identifier)?;
        let started = Instant::now();
        let tracked_parameters = parameters.clone();

        let result = match self.bind(&app, inputs, parameters).await {
            Ok((datasets, bound)) => self.execute(&app, datasets, bound).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(outputs) => {
                RunCompleted {
                    pipeline: app.name(),
                    node_count: app.pipeline().len(),
                    output_count: outputs.len(),
                    duration: started.elapsed(),
                }
                .log();
                self.track(identifier, &tracked_parameters, outputs);
            }
            Err(e) => RunFailed {
                pipeline: app.name(),
                error: e,
            }
            .log(),
        }

        result
    }

    fn app_names(&self) -> Vec<String> {
        self.registry
            .get(&self.entry)
            .map(|entry| entry.app_names(&self.entry))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{app_pipeline, AppPipelineSet};
    use crate::errors::NodeError;
    use crate::pipeline::Pipeline;
    use crate::tracking::MemoryTracker;
    use serde_json::json;

    fn outputs(pairs: &[(&str, Value)]) -> NodeOutputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn n1(_: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        Ok(outputs(&[("d", json!([0.5, 1.5, 0.25, 0.75]))]))
    }

    /// Fraction of distances inside the unit circle, times four.
    fn n2(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
        let d: Vec<f64> = args.input_as("d")?;
        let inside = d.iter().filter(|x| **x <= 1.0).count() as f64;
        Ok(outputs(&[("pi", json!(4.0 * inside / d.len() as f64))]))
    }

    fn estimate_pipeline() -> Pipeline {
        Pipeline::new(vec![
            Node::new("n1", n1).with_outputs(["d"]),
            Node::new("n2", n2).with_inputs(["d"]).with_outputs(["pi"]),
        ])
        .unwrap()
    }

    fn session(registry: Registry, entry: &str) -> LocalSession {
        LocalSession::new(Arc::new(registry), entry).unwrap()
    }

    fn no_args() -> HashMap<String, Value> {
        HashMap::new()
    }

    fn args(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_estimate() {
        let estimate = app_pipeline(estimate_pipeline(), "estimate")
            .outputs("pi")
            .build()
            .unwrap();
        let registry = Registry::builder()
            .register_apps("__default__", AppPipelineSet::try_from(estimate).unwrap())
            .register_pipeline("other", estimate_pipeline().namespace("other").unwrap())
            .build()
            .unwrap();

        let session = session(registry, "__default__");
        let result = session.run("estimate", no_args(), no_args()).await.unwrap();

        assert_eq!(result, args(&[("pi", json!(3.0))]));
        // intermediate datasets land in the catalog
        assert_eq!(session.dataset("d").await, Some(json!([0.5, 1.5, 0.25, 0.75])));
        assert_eq!(session.dataset("pi").await, None);
    }

    #[tokio::test]
    async fn test_namespace_punch_through_end_to_end() {
        let namespaced = estimate_pipeline()
            .namespace_with("ns", crate::pipeline::SlotMapping::new(), [("pi", "pi")])
            .unwrap();
        let app = app_pipeline(namespaced, "estimate").outputs("pi").build().unwrap();
        let registry = Registry::builder()
            .register_apps("__default__", AppPipelineSet::try_from(app).unwrap())
            .build()
            .unwrap();

        let session = session(registry, "__default__");
        let result = session.run("estimate", no_args(), no_args()).await.unwrap();

        assert_eq!(result["pi"], json!(3.0));
        assert!(session.dataset("ns.d").await.is_some());
    }

    #[tokio::test]
    async fn test_plain_pipeline_entry() {
        let registry = Registry::builder()
            .register_pipeline("monte_carlo", estimate_pipeline())
            .build()
            .unwrap();

        let session = session(registry, "monte_carlo");
        assert_eq!(session.app_names(), vec!["monte_carlo"]);

        // empty contract: nothing returned, everything saved
        let result = session.run("monte_carlo", no_args(), no_args()).await.unwrap();
        assert!(result.is_empty());
        assert_eq!(session.dataset("pi").await, Some(json!(3.0)));
    }

    #[tokio::test]
    async fn test_invocation_errors() {
        let sum = |a: &NodeArgs| -> Result<NodeOutputs, NodeError> {
            let x: f64 = a.input_as("x")?;
            let scale: f64 = a.parameter_as("scale")?;
            let offset: f64 = a.parameter_as("offset")?;
            Ok(outputs(&[("y", json!(x * scale + offset))]))
        };
        let p = Pipeline::new(vec![Node::new("affine", sum)
            .with_inputs(["x", "bias_table"])
            .with_outputs(["y"])
            .with_parameters(["scale", "offset"])])
        .unwrap();
        let app = app_pipeline(p, "affine")
            .inputs("x")
            .parameters("scale")
            .outputs("y")
            .build()
            .unwrap();
        let registry = Registry::builder()
            .register_apps("__default__", AppPipelineSet::try_from(app).unwrap())
            .build()
            .unwrap();

        struct TestCase {
            name: &'static str,
            identifier: &'static str,
            catalog: MemoryCatalog,
            inputs: HashMap<String, Value>,
            parameters: HashMap<String, Value>,
            expected: SessionError,
        }

        let configured = || {
            MemoryCatalog::new()
                .with_parameters(args(&[("offset", json!(1.0))]))
                .with_datasets(args(&[("bias_table", json!([]))]))
        };

        let test_cases = vec![
            TestCase {
                name: "unknown app",
                identifier: "nope",
                catalog: configured(),
                inputs: no_args(),
                parameters: no_args(),
                expected: SessionError::UnknownPipeline {
                    identifier: "nope".to_string(),
                    available: vec!["affine".to_string()],
                },
            },
            TestCase {
                name: "missing contract input",
                identifier: "affine",
                catalog: configured(),
                inputs: no_args(),
                parameters: args(&[("scale", json!(2.0))]),
                expected: SessionError::MissingInput {
                    pipeline: "affine".to_string(),
                    input: "x".to_string(),
                },
            },
            TestCase {
                name: "missing contract parameter",
                identifier: "affine",
                catalog: configured(),
                inputs: args(&[("x", json!(1.0))]),
                parameters: no_args(),
                expected: SessionError::MissingParameter {
                    pipeline: "affine".to_string(),
                    parameter: "scale".to_string(),
                },
            },
            TestCase {
                name: "undeclared input",
                identifier: "affine",
                catalog: configured(),
                inputs: args(&[("x", json!(1.0)), ("bias_table", json!([]))]),
                parameters: args(&[("scale", json!(2.0))]),
                expected: SessionError::UnexpectedInput {
                    pipeline: "affine".to_string(),
                    input: "bias_table".to_string(),
                },
            },
            TestCase {
                name: "undeclared parameter",
                identifier: "affine",
                catalog: configured(),
                inputs: args(&[("x", json!(1.0))]),
                parameters: args(&[("scale", json!(2.0)), ("offset", json!(0.0))]),
                expected: SessionError::UnexpectedParameter {
                    pipeline: "affine".to_string(),
                    parameter: "offset".to_string(),
                },
            },
            TestCase {
                name: "internal dataset missing from catalog",
                identifier: "affine",
                catalog: MemoryCatalog::new().with_parameters(args(&[("offset", json!(1.0))])),
                inputs: args(&[("x", json!(1.0))]),
                parameters: args(&[("scale", json!(2.0))]),
                expected: SessionError::MissingInput {
                    pipeline: "affine".to_string(),
                    input: "bias_table".to_string(),
                },
            },
            TestCase {
                name: "configured parameter missing",
                identifier: "affine",
                catalog: MemoryCatalog::new().with_datasets(args(&[("bias_table", json!([]))])),
                inputs: args(&[("x", json!(1.0))]),
                parameters: args(&[("scale", json!(2.0))]),
                expected: SessionError::MissingParameter {
                    pipeline: "affine".to_string(),
                    parameter: "offset".to_string(),
                },
            },
        ];

        let registry = Arc::new(registry);
        for test_case in test_cases {
            let session = LocalSession::new(Arc::clone(&registry), "__default__")
                .unwrap()
                .with_catalog(test_case.catalog);
            let result = session
                .run(test_case.identifier, test_case.inputs, test_case.parameters)
                .await;
            assert_eq!(
                result.err(),
                Some(test_case.expected),
                "Test case '{}'",
                test_case.name
            );
        }

        let session = LocalSession::new(Arc::clone(&registry), "__default__")
            .unwrap()
            .with_catalog(configured());
        let failed = session
            .run(
                "affine",
                args(&[("x", json!("not a number"))]),
                args(&[("scale", json!(2.0))]),
            )
            .await;
        assert!(matches!(
            failed,
            Err(SessionError::NodeFailed {
                ref node,
                source: NodeError::InvalidArgument { .. },
                ..
            }) if node == "affine"
        ));

        // and the happy path
        let session = LocalSession::new(registry, "__default__")
            .unwrap()
            .with_catalog(configured());
        let result = session
            .run("affine", args(&[("x", json!(3.0))]), args(&[("scale", json!(2.0))]))
            .await
            .unwrap();
        assert_eq!(result, args(&[("y", json!(7.0))]));
    }

    #[tokio::test]
    async fn test_missing_declared_output() {
        let silent = |_: &NodeArgs| -> Result<NodeOutputs, NodeError> { Ok(NodeOutputs::new()) };
        let p = Pipeline::new(vec![Node::new("silent", silent).with_outputs(["x"])]).unwrap();
        let registry = Registry::builder()
            .register_pipeline("silent", p)
            .build()
            .unwrap();

        let result = session(registry, "silent").run("silent", no_args(), no_args()).await;
        assert_eq!(
            result.err(),
            Some(SessionError::MissingOutput {
                pipeline: "silent".to_string(),
                node: "silent".to_string(),
                output: "x".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_artifacts_flow_between_apps() {
        let train = |a: &NodeArgs| -> Result<NodeOutputs, NodeError> {
            let xs: Vec<f64> = a.input_as("xs")?;
            Ok(outputs(&[("model", json!(xs.iter().sum::<f64>() / xs.len() as f64))]))
        };
        let predict = |a: &NodeArgs| -> Result<NodeOutputs, NodeError> {
            let model: f64 = a.input_as("model")?;
            let x: f64 = a.input_as("x")?;
            Ok(outputs(&[("prediction", json!(model + x))]))
        };

        let training = Pipeline::new(vec![Node::new("train", train)
            .with_inputs(["xs"])
            .with_outputs(["model"])])
        .unwrap()
        .namespace("training")
        .unwrap();
        let inference = crate::pipeline::Namespace::new("inference")
            .with_inputs([("model", "training.model")])
            .apply(
                &Pipeline::new(vec![Node::new("predict", predict)
                    .with_inputs(["model", "x"])
                    .with_outputs(["prediction"])])
                .unwrap(),
            )
            .unwrap();

        let training_app = app_pipeline(training, "training")
            .inputs([("xs", "training.xs")])
            .build()
            .unwrap();
        let inference_app = app_pipeline(inference, "inference")
            .inputs([("x", "inference.x")])
            .artifacts([("model", "training.model")])
            .outputs([("prediction", "inference.prediction")])
            .build()
            .unwrap();

        let registry = Registry::builder()
            .register_apps("__default__", (training_app + inference_app).unwrap())
            .build()
            .unwrap();
        let session = session(registry, "__default__");

        // artifact not produced yet
        let early = session
            .run("inference", args(&[("x", json!(1.0))]), no_args())
            .await;
        assert_eq!(
            early.err(),
            Some(SessionError::MissingArtifact {
                pipeline: "inference".to_string(),
                artifact: "model".to_string(),
            })
        );

        let trained = session
            .run("training", args(&[("xs", json!([1.0, 2.0, 3.0]))]), no_args())
            .await
            .unwrap();
        assert!(trained.is_empty());

        let predicted = session
            .run("inference", args(&[("x", json!(1.0))]), no_args())
            .await
            .unwrap();
        assert_eq!(predicted, args(&[("prediction", json!(3.0))]));
    }

    #[tokio::test]
    async fn test_unknown_entry() {
        let registry = Registry::builder().build().unwrap();
        let result = LocalSession::new(Arc::new(registry), "__default__");

        assert!(matches!(
            result.err(),
            Some(SessionError::UnknownPipeline { .. })
        ));
    }

    #[tokio::test]
    async fn test_wide_level_with_single_permit() {
        let nodes: Vec<Node> = (0..8)
            .map(|i| {
                let out = format!("x{}", i);
                let key = out.clone();
                Node::new(format!("n{}", i), move |_: &NodeArgs| -> Result<NodeOutputs, NodeError> {
                    Ok(outputs(&[(key.as_str(), json!(i))]))
                })
                .with_outputs([out])
            })
            .collect();
        let registry = Registry::builder()
            .register_pipeline("wide", Pipeline::new(nodes).unwrap())
            .build()
            .unwrap();

        let session = LocalSession::with_options(
            Arc::new(registry),
            "wide",
            SessionOptions { max_concurrency: 1 },
        )
        .unwrap();
        session.run("wide", no_args(), no_args()).await.unwrap();

        assert_eq!(session.catalog().await.list().len(), 8);
        assert_eq!(session.dataset("x7").await, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_failure_skips_queued_siblings() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let ran = Arc::new(AtomicBool::new(false));
        let slow_ran = Arc::clone(&ran);
        let nodes = vec![
            Node::new("a_fail", |_: &NodeArgs| -> Result<NodeOutputs, NodeError> {
                Err(NodeError::failed("boom"))
            })
            .with_outputs(["a"]),
            Node::new("b_slow", move |_: &NodeArgs| -> Result<NodeOutputs, NodeError> {
                std::thread::sleep(Duration::from_millis(300));
                slow_ran.store(true, Ordering::SeqCst);
                Ok(outputs(&[("b", json!(1))]))
            })
            .with_outputs(["b"]),
            Node::new("c_after", |_: &NodeArgs| -> Result<NodeOutputs, NodeError> {
                Ok(outputs(&[("c", json!(2))]))
            })
            .with_inputs(["b"])
            .with_outputs(["c"]),
        ];
        let registry = Registry::builder()
            .register_pipeline("fragile", Pipeline::new(nodes).unwrap())
            .build()
            .unwrap();
        let session = LocalSession::with_options(
            Arc::new(registry),
            "fragile",
            SessionOptions { max_concurrency: 1 },
        )
        .unwrap();

        let result = session.run("fragile", no_args(), no_args()).await;

        match result {
            Err(SessionError::NodeFailed { node, .. }) => assert_eq!(node, "a_fail"),
            other => panic!("expected a_fail to fail the run, got {:?}", other),
        }
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!ran.load(Ordering::SeqCst));
        assert!(session.catalog().await.list().is_empty());
    }

    #[tokio::test]
    async fn test_tracker_receives_parameters_and_metrics() {
        let scale = |a: &NodeArgs| -> Result<NodeOutputs, NodeError> {
            let factor: f64 = a.parameter_as("factor")?;
            Ok(outputs(&[("score", json!(factor * 0.5))]))
        };
        let p = Pipeline::new(vec![Node::new("score", scale)
            .with_outputs(["score"])
            .with_parameters(["factor"])])
        .unwrap();
        let app = app_pipeline(p, "score")
            .parameters("factor")
            .outputs("score")
            .build()
            .unwrap();
        let registry = Registry::builder()
            .register_apps("__default__", AppPipelineSet::try_from(app).unwrap())
            .build()
            .unwrap();

        let tracker = Arc::new(MemoryTracker::new());
        let session = session(registry, "__default__").with_tracker(tracker.clone());
        session
            .run("score", no_args(), args(&[("factor", json!(4.0))]))
            .await
            .unwrap();

        assert_eq!(tracker.runs(), vec!["score"]);
        assert_eq!(tracker.params("score"), args(&[("factor", json!(4.0))]));
        assert_eq!(tracker.metric_history("score", "score"), vec![(2.0, None)]);
    }
}

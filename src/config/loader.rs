// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_PIPELINE, NAMESPACE_SEPARATOR};
use crate::errors::ConfigError;
use crate::observability::messages::session::ConfigLoaded;
use crate::observability::messages::StructuredLog;
use crate::session::{default_concurrency, MemoryCatalog, SessionOptions};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Session configuration.
///
/// Names the registry entry to boot, the app to run by default, executor
/// options, and the values seeded into the data catalog. Loaded from YAML
/// (`.yaml`, `.yml`) or TOML (`.toml`).
///
/// # Fields
/// * `pipeline` - Registry entry the session boots on (defaults to `__default__`)
/// * `app` - App pipeline to run when none is given on the command line (optional)
/// * `executor_options` - Concurrency settings (optional)
/// * `parameters` - Configured parameters for slots an app leaves internal
/// * `datasets` - Initial catalog datasets
/// * `tracking` - Experiment tracking settings (optional)
///
/// # Example
/// ```yaml
/// pipeline: monte_carlo
/// app: estimate_pi
/// executor_options:
///   max_concurrency: 4
/// parameters:
///   radius: 1.0
///   model_options:
///     test_size: 0.2
/// datasets:
///   companies: []
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_pipeline")]
    pub pipeline: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
    #[serde(default)]
    pub datasets: HashMap<String, Value>,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

fn default_pipeline() -> String {
    DEFAULT_PIPELINE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: default_pipeline(),
            app: None,
            executor_options: ExecutorOptions::default(),
            parameters: HashMap::new(),
            datasets: HashMap::new(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Config {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_concurrency: self
                .executor_options
                .max_concurrency
                .unwrap_or_else(default_concurrency),
        }
    }

    /// Catalog seeded with the configured datasets and parameters.
    pub fn catalog(&self) -> MemoryCatalog {
        MemoryCatalog::new()
            .with_datasets(self.datasets.clone())
            .with_parameters(self.parameters.clone())
    }
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Maximum number of nodes running at once (optional,
///   defaults to available parallelism)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// Experiment tracking settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_tracking_enabled")]
    pub enabled: bool,
    pub experiment: Option<String>,
}

fn default_tracking_enabled() -> bool {
    true
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracking_enabled(),
            experiment: None,
        }
    }
}

enum Format {
    Yaml,
    Toml,
}

fn format_of(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("toml") => Ok(Format::Toml),
        _ => Err(ConfigError::Invalid {
            message: format!(
                "unsupported config format for '{}': expected .yaml, .yml or .toml",
                path.display()
            ),
        }),
    }
}

fn read_document<T, P>(path: P) -> Result<T, ConfigError>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let format = format_of(path)?;
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match format {
        Format::Yaml => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Load a config from a YAML or TOML file.
///
/// Nested parameter maps are additionally exposed under dotted keys, so
/// `model_options: {test_size: 0.2}` also defines `model_options.test_size`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let mut cfg: Config = read_document(path)?;
    cfg.parameters = flatten_parameters(cfg.parameters);

    ConfigLoaded {
        path: &path.display().to_string(),
        pipeline: &cfg.pipeline,
        parameter_count: cfg.parameters.len(),
        dataset_count: cfg.datasets.len(),
    }
    .log();

    Ok(cfg)
}

/// Load a config and check it for problems that would only surface at run
/// time. Every problem is reported, not just the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    let mut problems = Vec::new();
    if cfg.pipeline.trim().is_empty() {
        problems.push("pipeline must not be empty".to_string());
    }
    if let Some(app) = &cfg.app {
        if app.trim().is_empty() {
            problems.push("app must not be empty when set".to_string());
        }
    }
    if cfg.executor_options.max_concurrency == Some(0) {
        problems.push("executor_options.max_concurrency must be at least 1".to_string());
    }
    for name in cfg.parameters.keys().chain(cfg.datasets.keys()) {
        if name.trim().is_empty() {
            problems.push("parameter and dataset names must not be empty".to_string());
            break;
        }
    }

    if !problems.is_empty() {
        return Err(ConfigError::Invalid {
            message: format!("Configuration validation failed:\n{}", problems.join("\n")),
        });
    }

    Ok(cfg)
}

/// Load a standalone parameters file (a single YAML or TOML mapping).
pub fn load_parameters<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Value>, ConfigError> {
    let parameters: HashMap<String, Value> = read_document(path)?;
    Ok(flatten_parameters(parameters))
}

/// Add a dotted key for every value nested in a parameter map. Top-level
/// entries are kept as they are.
pub fn flatten_parameters(parameters: HashMap<String, Value>) -> HashMap<String, Value> {
    let mut flat = HashMap::new();
    for (key, value) in &parameters {
        if let Value::Object(nested) = value {
            flatten_into(key, nested, &mut flat);
        }
    }
    flat.extend(parameters);
    flat
}

fn flatten_into(prefix: &str, nested: &Map<String, Value>, flat: &mut HashMap<String, Value>) {
    for (key, value) in nested {
        let dotted = format!("{}{}{}", prefix, NAMESPACE_SEPARATOR, key);
        if let Value::Object(inner) = value {
            flatten_into(&dotted, inner, flat);
        }
        flat.insert(dotted, value.clone());
    }
}

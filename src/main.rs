// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use pipeline_boot::apps::monte_carlo::{MonteCarloApp, MonteCarloParams};
use pipeline_boot::apps::register_pipelines;
use pipeline_boot::config::{load_and_validate_config, Config};
use pipeline_boot::registry::Registry;
use pipeline_boot::session::LocalSession;
use pipeline_boot::tracking::{MemoryTracker, TracingTracker};
use pipeline_boot::traits::{ExperimentTracker, Session};

const MONTE_CARLO: &str = "monte_carlo";

/// What the command line asked for.
#[derive(Debug, Default)]
struct Invocation {
    config_file: String,
    app: Option<String>,
    inputs: HashMap<String, Value>,
    parameters: HashMap<String, Value>,
    list: bool,
}

fn usage(program: &str) {
    eprintln!("Usage: {} <config.yaml|config.toml> [app] [-i name=value ...] [-p name=value ...]", program);
    eprintln!("       {} <config> --list", program);
    eprintln!("Example: {} configs/spaceflights.yaml", program);
    eprintln!("Example: {} configs/monte_carlo.yaml estimate_pi -i 'distances=[0.2,0.9]' -p num_samples=2 -p radius=1.0", program);
    eprintln!("Example: {} configs/inference.toml -i 'features_store=[{{\"engines\":2,\"passenger_capacity\":5,\"crew\":3}}]'", program);
}

/// `name=value`, where value is JSON when it parses as JSON and a plain
/// string otherwise.
fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected name=value, got '{}'", raw);
    };
    if name.trim().is_empty() {
        bail!("missing name in '{}'", raw);
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.trim().to_string(), value))
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut invocation = Invocation::default();
    let mut rest = args.iter().skip(1);

    let Some(config_file) = rest.next() else {
        bail!("missing config file");
    };
    invocation.config_file = config_file.clone();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--list" => invocation.list = true,
            "-i" | "--input" => {
                let raw = rest.next().context("-i needs a name=value argument")?;
                let (name, value) = parse_assignment(raw)?;
                invocation.inputs.insert(name, value);
            }
            "-p" | "--param" => {
                let raw = rest.next().context("-p needs a name=value argument")?;
                let (name, value) = parse_assignment(raw)?;
                invocation.parameters.insert(name, value);
            }
            flag if flag.starts_with('-') => bail!("unknown option '{}'", flag),
            app if invocation.app.is_none() => invocation.app = Some(app.to_string()),
            extra => bail!("unexpected argument '{}'", extra),
        }
    }

    Ok(invocation)
}

fn tracker_for(config: &Config) -> Option<Arc<dyn ExperimentTracker>> {
    if !config.tracking.enabled {
        return None;
    }
    let tracker = match &config.tracking.experiment {
        Some(experiment) => TracingTracker::for_experiment(experiment),
        None => TracingTracker::new(),
    };
    Some(Arc::new(tracker))
}

fn print_registry(registry: &Registry) {
    println!("📚 Registered pipelines:");
    for (identifier, entry) in registry.iter() {
        println!(
            "  • {} ({}, {} nodes): {}",
            identifier,
            entry.kind(),
            entry.pipeline().len(),
            entry.app_names(identifier).join(", ")
        );
    }
}

/// The app to run when neither the command line nor the config names one.
fn default_app(entry: &str, available: Vec<String>) -> Result<String> {
    match available.as_slice() {
        [] => bail!("entry '{}' has no apps to run", entry),
        [only] => Ok(only.clone()),
        _ => bail!(
            "entry '{}' has several apps, pick one of: {}",
            entry,
            available.join(", ")
        ),
    }
}

async fn run_monte_carlo(
    session: &LocalSession,
    config: &Config,
    tracker: Option<Arc<dyn ExperimentTracker>>,
) -> Result<()> {
    let params = MonteCarloParams::from_parameters(&config.parameters)?;
    let tracker: Arc<dyn ExperimentTracker> = match tracker {
        Some(tracker) => tracker,
        None => Arc::new(MemoryTracker::new()),
    };

    println!(
        "🎲 Sweeping {}..{} by {} samples (radius {})",
        params.sample_range.start, params.sample_range.stop, params.sample_range.step, params.radius
    );
    let estimates = MonteCarloApp::new(params, tracker).run(session).await?;
    for (num_samples, estimate) in estimates {
        println!("  {:>8} samples → π ≈ {:.6}", num_samples, estimate);
    }
    Ok(())
}

async fn run(invocation: Invocation) -> Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(&invocation.config_file)
        .with_context(|| format!("loading {}", invocation.config_file))?;
    let registry = Arc::new(register_pipelines().context("registering pipelines")?);

    if invocation.list {
        print_registry(&registry);
        return Ok(());
    }

    let tracker = tracker_for(&config);
    let session =
        LocalSession::with_options(Arc::clone(&registry), &config.pipeline, config.session_options())?
            .with_catalog(config.catalog());

    println!("📋 Configuration: {}", invocation.config_file);
    println!("🧩 Entry: {}", config.pipeline);
    println!("⚙️  Max Concurrency: {}", session.options().max_concurrency);

    let app = invocation.app.clone().or_else(|| config.app.clone());
    let app = match app {
        Some(app) => app,
        None if config.pipeline == MONTE_CARLO => {
            run_monte_carlo(&session, &config, tracker).await?;
            println!("\n⏱️  Total Time: {:?}", start_time.elapsed());
            return Ok(());
        }
        None => default_app(&config.pipeline, session.app_names())?,
    };

    let session = match tracker {
        Some(tracker) => session.with_tracker(tracker),
        None => session,
    };

    println!("🚀 Running app '{}'", app);
    let outputs = session
        .run(&app, invocation.inputs, invocation.parameters)
        .await?;

    println!("\n📊 Outputs:");
    if outputs.is_empty() {
        println!("   (none returned; results stay in the catalog)");
    }
    let mut names: Vec<&String> = outputs.keys().collect();
    names.sort();
    for name in names {
        println!("  • {}: {}", name, serde_json::to_string_pretty(&outputs[name])?);
    }

    let catalog = session.catalog().await;
    println!("\n🗂️  Catalog: {}", catalog.list().join(", "));
    println!("\n⏱️  Total Time: {:?}", start_time.elapsed());

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("❌ {}", e);
            usage(args.first().map(String::as_str).unwrap_or("pipeline-boot"));
            std::process::exit(1);
        }
    };

    if let Err(e) = run(invocation).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

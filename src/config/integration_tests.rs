// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;

    use crate::apps::monte_carlo::{MonteCarloApp, MonteCarloParams, SampleRange};
    use crate::apps::register_pipelines;
    use crate::config::load_and_validate_config;
    use crate::session::LocalSession;
    use crate::tracking::MemoryTracker;
    use crate::traits::Session;

    /// Test that the Monte-Carlo configuration loads and yields app settings
    #[test]
    fn test_monte_carlo_yaml_loading() {
        let config = load_and_validate_config("configs/monte_carlo.yaml").unwrap();

        assert_eq!(config.pipeline, "monte_carlo");
        assert_eq!(config.app, None);
        assert_eq!(config.executor_options.max_concurrency, Some(4));
        assert_eq!(config.parameters["sample_range.step"], json!(300));
        assert_eq!(config.tracking.experiment.as_deref(), Some("monte_carlo_pi"));

        let params = MonteCarloParams::from_parameters(&config.parameters).unwrap();
        assert_eq!(
            params.sample_range,
            SampleRange {
                start: 100,
                stop: 1001,
                step: 300
            }
        );
        assert_eq!(params.sample_counts().collect::<Vec<_>>(), vec![100, 400, 700, 1000]);
    }

    /// Test the TOML inference configuration
    #[test]
    fn test_inference_toml_loading() {
        let config = load_and_validate_config("configs/inference.toml").unwrap();

        assert_eq!(config.pipeline, "__default__");
        assert_eq!(config.app.as_deref(), Some("inference"));
        assert!(!config.tracking.enabled);
        assert_eq!(
            config.datasets["training.regressor"]["intercept"],
            json!(400.0)
        );
    }

    /// Test a session booted from the data processing configuration
    #[tokio::test]
    async fn test_data_processing_session_from_yaml() {
        let config = load_and_validate_config("configs/data_processing.yaml").unwrap();
        let registry = Arc::new(register_pipelines().unwrap());
        let session =
            LocalSession::with_options(registry, &config.pipeline, config.session_options())
                .unwrap()
                .with_catalog(config.catalog());

        session
            .run(&config.pipeline, HashMap::new(), HashMap::new())
            .await
            .unwrap();

        // the company without a rating drops its shuttle
        let store = session.dataset("features_store").await.unwrap();
        assert_eq!(store.as_array().unwrap().len(), 2);
    }

    /// Test the spaceflights configuration end to end
    #[tokio::test]
    async fn test_spaceflights_session_from_yaml() {
        let config = load_and_validate_config("configs/spaceflights.yaml").unwrap();
        let registry = Arc::new(register_pipelines().unwrap());
        let session =
            LocalSession::with_options(registry, &config.pipeline, config.session_options())
                .unwrap()
                .with_catalog(config.catalog());

        session
            .run(&config.pipeline, HashMap::new(), HashMap::new())
            .await
            .unwrap();

        assert!(session.dataset("training.regressor").await.is_some());
        assert!(session
            .dataset("training.regression_score")
            .await
            .and_then(|v| v.as_f64())
            .is_some());
        let predictions = session.dataset("inference.predictions").await.unwrap();
        assert_eq!(predictions.as_array().unwrap().len(), 12);
    }

    /// Test the Monte-Carlo sweep driven by its configuration
    #[tokio::test]
    async fn test_monte_carlo_sweep_from_yaml() {
        let config = load_and_validate_config("configs/monte_carlo.yaml").unwrap();
        let registry = Arc::new(register_pipelines().unwrap());
        let session =
            LocalSession::with_options(registry, &config.pipeline, config.session_options())
                .unwrap();
        let tracker = Arc::new(MemoryTracker::new());
        let app = MonteCarloApp::new(
            MonteCarloParams::from_parameters(&config.parameters).unwrap(),
            tracker.clone(),
        );

        let estimates = app.run(&session).await.unwrap();

        assert_eq!(estimates.len(), 4);
        let (_, last) = estimates[3];
        // standard error at 1000 draws is about 0.05
        assert!((last - std::f64::consts::PI).abs() < 0.25);
        assert_eq!(
            tracker.metric_history(MonteCarloApp::RUN_NAME, "estimated_pi").len(),
            4
        );
    }
}

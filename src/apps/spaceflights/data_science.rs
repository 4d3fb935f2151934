// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Feature selection, a least-squares price regressor, and its evaluation.
//!
//! The node groups are kept separate so the training, inference and
//! evaluation pipelines can reassemble them under their own namespaces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::{CompositionError, NodeError};
use crate::pipeline::{Node, Pipeline};
use crate::traits::{NodeArgs, NodeOutputs};

/// Numeric feature matrix with named columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// Ordinary least squares fit: `price = intercept + Σ coefficient·feature`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub columns: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

const LABEL_COLUMN: &str = "price";

fn to_value(value: impl Serialize) -> Result<Value, NodeError> {
    serde_json::to_value(value).map_err(|e| NodeError::failed(e.to_string()))
}

fn numeric(row: usize, column: &str, value: Option<&Value>) -> Result<f64, NodeError> {
    match value {
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(v) => v.as_f64().ok_or_else(|| {
            NodeError::failed(format!("column '{}' is not numeric in row {}", column, row))
        }),
        None => Err(NodeError::failed(format!(
            "column '{}' is missing from row {}",
            column, row
        ))),
    }
}

fn select_features(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let store: Vec<Map<String, Value>> = args.input_as("features_store")?;
    let columns: Vec<String> = args.parameter_as("feature_columns")?;
    if columns.is_empty() {
        return Err(NodeError::InvalidArgument {
            name: "feature_columns".to_string(),
            reason: "at least one column is required".to_string(),
        });
    }

    let rows = store
        .iter()
        .enumerate()
        .map(|(i, row)| {
            columns
                .iter()
                .map(|c| numeric(i, c, row.get(c)))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HashMap::from([(
        "features".to_string(),
        to_value(FeatureTable { columns, rows })?,
    )]))
}

fn select_labels(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let store: Vec<Map<String, Value>> = args.input_as("features_store")?;
    let labels = store
        .iter()
        .enumerate()
        .map(|(i, row)| numeric(i, LABEL_COLUMN, row.get(LABEL_COLUMN)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HashMap::from([("labels".to_string(), json!(labels))]))
}

/// Holds out the last `ceil(n * test_size)` rows, keeping at least one row
/// on each side.
fn split_data(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let features: FeatureTable = args.input_as("features")?;
    let labels: Vec<f64> = args.input_as("labels")?;
    let test_size: f64 = args.parameter_as("test_size")?;

    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(NodeError::InvalidArgument {
            name: "test_size".to_string(),
            reason: format!("must be between 0 and 1, got {}", test_size),
        });
    }
    let n = features.rows.len();
    if n != labels.len() {
        return Err(NodeError::failed(format!(
            "{} feature rows but {} labels",
            n,
            labels.len()
        )));
    }
    if n < 2 {
        return Err(NodeError::failed("need at least two rows to split"));
    }

    let test_count = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
    let cut = n - test_count;

    let (train_rows, test_rows) = features.rows.split_at(cut);
    let (train_labels, test_labels) = labels.split_at(cut);

    Ok(HashMap::from([
        (
            "X_train".to_string(),
            to_value(FeatureTable {
                columns: features.columns.clone(),
                rows: train_rows.to_vec(),
            })?,
        ),
        (
            "X_test".to_string(),
            to_value(FeatureTable {
                columns: features.columns.clone(),
                rows: test_rows.to_vec(),
            })?,
        ),
        ("y_train".to_string(), json!(train_labels)),
        ("y_test".to_string(), json!(test_labels)),
    ]))
}

/// Solves `a · x = b` in place by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < 1e-10 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        let pivot_row = a[col].clone();
        let pivot_b = b[col];
        for row in col + 1..n {
            let factor = a[row][col] / pivot_row[col];
            for (k, pivot_value) in pivot_row.iter().enumerate().skip(col) {
                a[row][k] -= factor * pivot_value;
            }
            b[row] -= factor * pivot_b;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}

fn fit(features: &FeatureTable, labels: &[f64]) -> Result<LinearModel, NodeError> {
    if features.rows.is_empty() || features.rows.len() != labels.len() {
        return Err(NodeError::failed(format!(
            "cannot fit {} rows against {} labels",
            features.rows.len(),
            labels.len()
        )));
    }

    // normal equations over [1, x1, .., xk]
    let width = features.columns.len() + 1;
    let mut xtx = vec![vec![0.0; width]; width];
    let mut xty = vec![0.0; width];
    for (row, y) in features.rows.iter().zip(labels) {
        let design: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
        for i in 0..width {
            xty[i] += design[i] * y;
            for j in 0..width {
                xtx[i][j] += design[i] * design[j];
            }
        }
    }
    let solution = solve(xtx, xty)
        .ok_or_else(|| NodeError::failed("training data is singular; cannot fit regressor"))?;

    Ok(LinearModel {
        columns: features.columns.clone(),
        intercept: solution[0],
        coefficients: solution[1..].to_vec(),
    })
}

fn train_model(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let features: FeatureTable = args.input_as("X_train")?;
    let labels: Vec<f64> = args.input_as("y_train")?;

    let model = fit(&features, &labels)?;
    tracing::debug!(
        columns = model.columns.len(),
        rows = features.rows.len(),
        "Regressor trained"
    );

    Ok(HashMap::from([("regressor".to_string(), to_value(model)?)]))
}

fn predict(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let model: LinearModel = args.input_as("regressor")?;
    let features: FeatureTable = args.input_as("features")?;

    if features.columns != model.columns {
        return Err(NodeError::failed(format!(
            "regressor expects columns {:?}, got {:?}",
            model.columns, features.columns
        )));
    }

    let predictions: Vec<f64> = features.rows.iter().map(|r| model.predict_row(r)).collect();
    Ok(HashMap::from([("predictions".to_string(), json!(predictions))]))
}

/// Coefficient of determination.
fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn evaluate_model(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let predictions: Vec<f64> = args.input_as("predictions")?;
    let labels: Vec<f64> = args.input_as("labels")?;

    if predictions.is_empty() || predictions.len() != labels.len() {
        return Err(NodeError::failed(format!(
            "{} predictions for {} labels",
            predictions.len(),
            labels.len()
        )));
    }

    let score = r2_score(&labels, &predictions);
    tracing::info!(score, "Model has a coefficient R^2 of {:.3} on test data", score);
    Ok(HashMap::from([("regression_score".to_string(), json!(score))]))
}

/// `features_store -> features` and `features_store -> labels`.
pub fn model_input_nodes() -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![
        Node::new("select_features", select_features)
            .with_inputs(["features_store"])
            .with_outputs(["features"])
            .with_parameters(["feature_columns"]),
        Node::new("select_labels", select_labels)
            .with_inputs(["features_store"])
            .with_outputs(["labels"]),
    ])
}

/// Only the feature selection, for pipelines that never see a price.
pub fn feature_nodes() -> Result<Pipeline, CompositionError> {
    model_input_nodes()?.only_nodes(["select_features"])
}

pub fn model_training_nodes() -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![
        Node::new("split_data", split_data)
            .with_inputs(["features", "labels"])
            .with_outputs(["X_train", "X_test", "y_train", "y_test"])
            .with_parameters(["test_size"]),
        Node::new("train_model", train_model)
            .with_inputs(["X_train", "y_train"])
            .with_outputs(["regressor"])
            .with_tags(["training"]),
    ])
}

pub fn prediction_nodes() -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![Node::new("predict", predict)
        .with_inputs(["regressor", "features"])
        .with_outputs(["predictions"])])
}

pub fn evaluation_nodes() -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![Node::new("evaluate_model", evaluate_model)
        .with_inputs(["predictions", "labels"])
        .with_outputs(["regression_score"])])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<f64>>) -> FeatureTable {
        FeatureTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_fit_recovers_linear_relation() {
        // price = 100 + 10 * engines + 5 * crew
        let features = table(
            &["engines", "crew"],
            vec![
                vec![1.0, 1.0],
                vec![2.0, 1.0],
                vec![1.0, 3.0],
                vec![4.0, 2.0],
                vec![3.0, 5.0],
            ],
        );
        let labels: Vec<f64> = features
            .rows
            .iter()
            .map(|r| 100.0 + 10.0 * r[0] + 5.0 * r[1])
            .collect();

        let model = fit(&features, &labels).unwrap();

        assert!((model.intercept - 100.0).abs() < 1e-4);
        assert!((model.coefficients[0] - 10.0).abs() < 1e-4);
        assert!((model.coefficients[1] - 5.0).abs() < 1e-4);
        assert!((model.predict_row(&[2.0, 2.0]) - 130.0).abs() < 1e-4);
    }

    #[test]
    fn test_fit_rejects_singular_data() {
        let features = table(&["engines"], vec![vec![1.0], vec![1.0], vec![1.0]]);
        assert!(fit(&features, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_r2_score() {
        struct TestCase {
            name: &'static str,
            actual: Vec<f64>,
            predicted: Vec<f64>,
            expected: f64,
        }

        let test_cases = vec![
            TestCase {
                name: "perfect",
                actual: vec![1.0, 2.0, 3.0],
                predicted: vec![1.0, 2.0, 3.0],
                expected: 1.0,
            },
            TestCase {
                name: "mean predictor",
                actual: vec![1.0, 2.0, 3.0],
                predicted: vec![2.0, 2.0, 2.0],
                expected: 0.0,
            },
            TestCase {
                name: "constant labels",
                actual: vec![5.0, 5.0],
                predicted: vec![5.0, 5.0],
                expected: 1.0,
            },
        ];

        for test_case in test_cases {
            let score = r2_score(&test_case.actual, &test_case.predicted);
            assert!(
                (score - test_case.expected).abs() < 1e-12,
                "Test case '{}': expected {}, got {}",
                test_case.name,
                test_case.expected,
                score
            );
        }
    }

    #[test]
    fn test_split_data_keeps_both_sides() {
        let args = NodeArgs::new(
            HashMap::from([
                (
                    "features".to_string(),
                    to_value(table(&["a"], vec![vec![1.0], vec![2.0], vec![3.0]])).unwrap(),
                ),
                ("labels".to_string(), json!([1.0, 2.0, 3.0])),
            ]),
            HashMap::from([("test_size".to_string(), json!(0.1))]),
        );

        let outputs = split_data(&args).unwrap();

        assert_eq!(outputs["y_train"], json!([1.0, 2.0]));
        assert_eq!(outputs["y_test"], json!([3.0]));
    }

    #[test]
    fn test_select_features_encodes_flags() {
        let args = NodeArgs::new(
            HashMap::from([(
                "features_store".to_string(),
                json!([{"engines": 2, "iata_approved": true}, {"engines": 1.5, "iata_approved": false}]),
            )]),
            HashMap::from([("feature_columns".to_string(), json!(["engines", "iata_approved"]))]),
        );

        let outputs = select_features(&args).unwrap();
        let features: FeatureTable = serde_json::from_value(outputs["features"].clone()).unwrap();

        assert_eq!(features.rows, vec![vec![2.0, 1.0], vec![1.5, 0.0]]);
    }

    #[test]
    fn test_select_features_missing_column() {
        let args = NodeArgs::new(
            HashMap::from([("features_store".to_string(), json!([{"engines": 2}]))]),
            HashMap::from([("feature_columns".to_string(), json!(["crew"]))]),
        );

        assert!(matches!(select_features(&args), Err(NodeError::Failed(_))));
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Raw companies, shuttles and reviews into the `features_store` table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{CompositionError, NodeError};
use crate::pipeline::{Node, Pipeline};
use crate::traits::{NodeArgs, NodeOutputs};

#[derive(Debug, Clone, Deserialize)]
struct Company {
    id: u64,
    #[serde(default)]
    company_rating: Option<String>,
    #[serde(default)]
    iata_approved: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreprocessedCompany {
    id: u64,
    company_rating: Option<f64>,
    iata_approved: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
struct Shuttle {
    id: u64,
    company_id: u64,
    #[serde(default)]
    engines: Option<f64>,
    #[serde(default)]
    passenger_capacity: Option<f64>,
    #[serde(default)]
    crew: Option<f64>,
    #[serde(default)]
    d_check_complete: Option<String>,
    #[serde(default)]
    moon_clearance_complete: Option<String>,
    #[serde(default)]
    price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PreprocessedShuttle {
    id: u64,
    company_id: u64,
    engines: Option<f64>,
    passenger_capacity: Option<f64>,
    crew: Option<f64>,
    d_check_complete: Option<bool>,
    moon_clearance_complete: Option<bool>,
    price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct Review {
    shuttle_id: u64,
    #[serde(default)]
    review_scores_rating: Option<f64>,
}

/// One row of `features_store`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInputRow {
    pub shuttle_id: u64,
    pub engines: f64,
    pub passenger_capacity: f64,
    pub crew: f64,
    pub d_check_complete: bool,
    pub moon_clearance_complete: bool,
    pub iata_approved: bool,
    pub company_rating: f64,
    pub review_scores_rating: f64,
    pub price: f64,
}

fn parse_flag(field: &str, value: Option<&str>) -> Result<Option<bool>, NodeError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some("t") | Some("true") => Ok(Some(true)),
        Some("f") | Some("false") => Ok(Some(false)),
        Some(other) => Err(NodeError::failed(format!(
            "'{}' is not a valid value for {}",
            other, field
        ))),
    }
}

/// `"90%"` -> `0.9`.
fn parse_percentage(value: Option<&str>) -> Result<Option<f64>, NodeError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .trim_end_matches('%')
            .parse::<f64>()
            .map(|v| Some(v / 100.0))
            .map_err(|_| NodeError::failed(format!("'{}' is not a percentage", raw))),
    }
}

/// `"$1,325.0"` -> `1325.0`.
fn parse_money(value: Option<&str>) -> Result<Option<f64>, NodeError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .replace(['$', ','], "")
            .parse::<f64>()
            .map(Some)
            .map_err(|_| NodeError::failed(format!("'{}' is not an amount", raw))),
    }
}

fn single(name: &str, value: impl Serialize) -> Result<NodeOutputs, NodeError> {
    let value = serde_json::to_value(value).map_err(|e| NodeError::failed(e.to_string()))?;
    Ok(HashMap::from([(name.to_string(), value)]))
}

fn preprocess_companies(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let companies: Vec<Company> = args.input_as("companies")?;

    let preprocessed = companies
        .into_iter()
        .map(|c| {
            Ok(PreprocessedCompany {
                id: c.id,
                company_rating: parse_percentage(c.company_rating.as_deref())?,
                iata_approved: parse_flag("iata_approved", c.iata_approved.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, NodeError>>()?;

    single("preprocessed_companies", preprocessed)
}

fn preprocess_shuttles(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let shuttles: Vec<Shuttle> = args.input_as("shuttles")?;

    let preprocessed = shuttles
        .into_iter()
        .map(|s| {
            Ok(PreprocessedShuttle {
                id: s.id,
                company_id: s.company_id,
                engines: s.engines,
                passenger_capacity: s.passenger_capacity,
                crew: s.crew,
                d_check_complete: parse_flag("d_check_complete", s.d_check_complete.as_deref())?,
                moon_clearance_complete: parse_flag(
                    "moon_clearance_complete",
                    s.moon_clearance_complete.as_deref(),
                )?,
                price: parse_money(s.price.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>, NodeError>>()?;

    single("preprocessed_shuttles", preprocessed)
}

/// Joins shuttles with their reviews and companies; rows with any missing
/// field are dropped.
fn create_model_input_table(args: &NodeArgs) -> Result<NodeOutputs, NodeError> {
    let shuttles: Vec<PreprocessedShuttle> = args.input_as("preprocessed_shuttles")?;
    let companies: Vec<PreprocessedCompany> = args.input_as("preprocessed_companies")?;
    let reviews: Vec<Review> = args.input_as("reviews")?;

    let companies: HashMap<u64, PreprocessedCompany> =
        companies.into_iter().map(|c| (c.id, c)).collect();
    let reviews: HashMap<u64, f64> = reviews
        .into_iter()
        .filter_map(|r| r.review_scores_rating.map(|score| (r.shuttle_id, score)))
        .collect();

    let rows: Vec<ModelInputRow> = shuttles
        .into_iter()
        .filter_map(|s| {
            let company = companies.get(&s.company_id)?;
            Some(ModelInputRow {
                shuttle_id: s.id,
                engines: s.engines?,
                passenger_capacity: s.passenger_capacity?,
                crew: s.crew?,
                d_check_complete: s.d_check_complete?,
                moon_clearance_complete: s.moon_clearance_complete?,
                iata_approved: company.iata_approved?,
                company_rating: company.company_rating?,
                review_scores_rating: *reviews.get(&s.id)?,
                price: s.price?,
            })
        })
        .collect();

    tracing::debug!(rows = rows.len(), "Model input table created");
    single("features_store", rows)
}

pub fn create_pipeline() -> Result<Pipeline, CompositionError> {
    Pipeline::new(vec![
        Node::new("preprocess_companies", preprocess_companies)
            .with_inputs(["companies"])
            .with_outputs(["preprocessed_companies"])
            .with_tags(["data_processing"]),
        Node::new("preprocess_shuttles", preprocess_shuttles)
            .with_inputs(["shuttles"])
            .with_outputs(["preprocessed_shuttles"])
            .with_tags(["data_processing"]),
        Node::new("create_model_input_table", create_model_input_table)
            .with_inputs(["preprocessed_shuttles", "preprocessed_companies", "reviews"])
            .with_outputs(["features_store"])
            .with_tags(["data_processing"]),
    ])
}

/// Parses a raw `features_store` value back into typed rows.
pub fn model_input_rows(value: &Value) -> Result<Vec<ModelInputRow>, serde_json::Error> {
    serde_json::from_value(value.clone())
}

//! Wire types for the Cost Explorer `GetCostAndUsage` operation
//!
//! Field names follow the API's PascalCase JSON. Everything the flattener
//! validates is optional here so a bad response surfaces as a
//! `MalformedResponse` with context instead of an opaque serde error.

use crate::types::{CostQuery, Granularity, TimeWindow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request body for one page of `GetCostAndUsage`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostAndUsageRequest {
    pub time_period: DateInterval,
    pub granularity: String,
    pub metrics: Vec<String>,
    pub group_by: Vec<GroupDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl CostAndUsageRequest {
    /// Build the first-page request for a query
    ///
    /// Hourly queries take full UTC timestamps instead of plain dates.
    pub fn from_query(query: &CostQuery) -> Self {
        let format: fn(&NaiveDate) -> String = match query.granularity {
            Granularity::Hourly => TimeWindow::format_timestamp,
            Granularity::Daily | Granularity::Monthly => TimeWindow::format_date,
        };
        Self {
            time_period: DateInterval {
                start: Some(format(&query.window.start)),
                end: Some(format(&query.window.end)),
            },
            granularity: query.granularity.as_str().to_string(),
            metrics: vec![query.metric.as_str().to_string()],
            group_by: query
                .group_by
                .selectors()
                .iter()
                .map(|selector| GroupDefinition {
                    kind: selector.kind().to_string(),
                    key: selector.key().to_string(),
                })
                .collect(),
            next_page_token: None,
        }
    }

    /// Same request, continuing from `token`
    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.next_page_token = token;
        self
    }
}

/// `{ "Start": ..., "End": ... }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DateInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// `{ "Type": "DIMENSION" | "TAG", "Key": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDefinition {
    #[serde(rename = "Type")]
    pub kind: String,
    pub key: String,
}

/// One page of results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetCostAndUsageResponse {
    #[serde(default)]
    pub results_by_time: Vec<ResultByTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_definitions: Vec<GroupDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimension_value_attributes: Vec<DimensionValueAttributes>,
}

impl GetCostAndUsageResponse {
    /// `(value, description)` pairs, e.g. linked account ID and account name
    pub fn dimension_labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dimension_value_attributes.iter().filter_map(|entry| {
            let value = entry.value.as_deref()?;
            let description = entry.attributes.get("description")?;
            Some((value, description.as_str()))
        })
    }
}

/// `{ "Value": "111122223333", "Attributes": { "description": "Data Prod" } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionValueAttributes {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// One time bucket as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultByTime {
    #[serde(default)]
    pub time_period: Option<DateInterval>,
    #[serde(default)]
    pub total: HashMap<String, MetricValue>,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub estimated: bool,
}

/// One group within a time bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawGroup {
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    #[serde(default)]
    pub metrics: HashMap<String, MetricValue>,
}

/// `{ "Amount": "12.50", "Unit": "USD" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricValue {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

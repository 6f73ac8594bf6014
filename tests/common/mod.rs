//! Common test utilities and helpers for awscost tests
//!
//! This module provides raw Cost Explorer record builders and an in-memory
//! client so the fetch → flatten → aggregate → format pipeline can be
//! exercised without AWS.

#![allow(dead_code)]

use async_trait::async_trait;
use awscost::Result;
use awscost_core::provider::CostQueryClient;
use awscost_core::raw::{
    CostAndUsageRequest, DateInterval, DimensionValueAttributes, GetCostAndUsageResponse,
    MetricValue, RawGroup, ResultByTime,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Common test account IDs
pub const TEST_ACCOUNTS: &[&str] = &["111111111111", "222222222222", "333333333333"];

pub const DATA_DEV: &str = "111111111111";
pub const DATA_PROD: &str = "222222222222";
pub const ROOT: &str = "333333333333";

/// Account names as reported in `DimensionValueAttributes`
pub const ACCOUNT_NAMES: &[(&str, &str)] = &[
    (DATA_DEV, "Data Dev"),
    (DATA_PROD, "Data Prod"),
    (ROOT, "Root"),
];

/// Common test services
pub const TEST_SERVICES: &[&str] = &[
    "AWS Glue",
    "AWS Lambda",
    "Amazon Redshift",
    "Amazon Simple Storage Service",
];

/// Builder for a single time bucket
pub struct BucketBuilder {
    start: String,
    end: String,
    groups: Vec<RawGroup>,
    total: HashMap<String, MetricValue>,
    estimated: bool,
}

impl BucketBuilder {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            groups: Vec::new(),
            total: HashMap::new(),
            estimated: false,
        }
    }

    /// Add a group with an `UnblendedCost` amount in USD
    pub fn with_group(self, keys: &[&str], amount: &str) -> Self {
        self.with_metric_group("UnblendedCost", keys, amount, "USD")
    }

    pub fn with_metric_group(mut self, metric: &str, keys: &[&str], amount: &str, unit: &str) -> Self {
        let mut metrics = HashMap::new();
        metrics.insert(
            metric.to_string(),
            MetricValue {
                amount: Some(amount.to_string()),
                unit: Some(unit.to_string()),
            },
        );
        self.groups.push(RawGroup {
            keys: Some(keys.iter().map(|k| k.to_string()).collect()),
            metrics,
        });
        self
    }

    pub fn with_total(mut self, amount: &str) -> Self {
        self.total.insert(
            "UnblendedCost".to_string(),
            MetricValue {
                amount: Some(amount.to_string()),
                unit: Some("USD".to_string()),
            },
        );
        self
    }

    pub fn estimated(mut self) -> Self {
        self.estimated = true;
        self
    }

    pub fn build(self) -> ResultByTime {
        ResultByTime {
            time_period: Some(DateInterval {
                start: Some(self.start),
                end: Some(self.end),
            }),
            total: self.total,
            groups: self.groups,
            estimated: self.estimated,
        }
    }
}

/// A response page carrying `results` and an optional continuation token
pub fn page(results: Vec<ResultByTime>, token: Option<&str>) -> GetCostAndUsageResponse {
    GetCostAndUsageResponse {
        results_by_time: results,
        next_page_token: token.map(|t| t.to_string()),
        group_definitions: Vec::new(),
        dimension_value_attributes: Vec::new(),
    }
}

/// `DimensionValueAttributes` entries naming the test accounts
pub fn account_attributes() -> Vec<DimensionValueAttributes> {
    ACCOUNT_NAMES
        .iter()
        .map(|(id, name)| DimensionValueAttributes {
            value: Some(id.to_string()),
            attributes: HashMap::from([("description".to_string(), name.to_string())]),
        })
        .collect()
}

/// In-memory client serving pages by continuation token
///
/// The first request (no token) gets the page stored under `""`.
pub struct FakeClient {
    pages: HashMap<String, GetCostAndUsageResponse>,
    requests: Mutex<Vec<CostAndUsageRequest>>,
}

impl FakeClient {
    /// Chain `pages` together with generated tokens
    pub fn chained(pages: Vec<Vec<ResultByTime>>) -> Self {
        let count = pages.len();
        let mut by_token = HashMap::new();
        for (i, results) in pages.into_iter().enumerate() {
            let key = if i == 0 {
                String::new()
            } else {
                format!("token-{i}")
            };
            let next = (i + 1 < count).then(|| format!("token-{}", i + 1));
            by_token.insert(key, page(results, next.as_deref()));
        }
        Self {
            pages: by_token,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Attach the test account names to the first page
    pub fn with_account_names(mut self) -> Self {
        if let Some(first) = self.pages.get_mut("") {
            first.dimension_value_attributes = account_attributes();
        }
        self
    }

    pub fn requests(&self) -> Vec<CostAndUsageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CostQueryClient for FakeClient {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> Result<GetCostAndUsageResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let key = request.next_page_token.clone().unwrap_or_default();
        self.pages.get(&key).cloned().ok_or_else(|| {
            awscost::AwsCostError::fetch("GetCostAndUsage", format!("unknown token {key:?}"))
        })
    }
}

/// Monthly account/service buckets for the sample organization
pub fn account_pages() -> Vec<Vec<ResultByTime>> {
    vec![
        vec![
            BucketBuilder::new("2024-01-01", "2024-02-01")
                .with_group(&[DATA_PROD, "Amazon Simple Storage Service"], "120.50")
                .with_group(&[DATA_DEV, "AWS Glue"], "30.25")
                .build(),
            BucketBuilder::new("2024-02-01", "2024-03-01")
                .with_group(&[DATA_PROD, "Amazon Simple Storage Service"], "130.00")
                .with_group(&[ROOT, "AWS Lambda"], "0.75")
                .build(),
        ],
        vec![
            BucketBuilder::new("2024-03-01", "2024-03-15")
                .with_group(&[DATA_PROD, "Amazon Simple Storage Service"], "60.00")
                .with_group(&[DATA_PROD, "Amazon Redshift"], "45.10")
                .with_group(&[DATA_DEV, "AWS Glue"], "12.00")
                .with_group(&[ROOT, "AWS Lambda"], "0.40")
                .estimated()
                .build(),
        ],
    ]
}

/// Daily tag/service buckets around 2024-03-14
pub fn tag_pages() -> Vec<Vec<ResultByTime>> {
    vec![
        vec![
            BucketBuilder::new("2024-02-29", "2024-03-01")
                .with_group(&["source$", "AWS Glue"], "9.00")
                .build(),
            BucketBuilder::new("2024-03-13", "2024-03-14")
                .with_group(&["source$etl", "AWS Glue"], "4.00")
                .with_group(&["source$", "Amazon Redshift"], "2.00")
                .build(),
        ],
        vec![
            BucketBuilder::new("2024-03-14", "2024-03-15")
                .with_group(&["source$etl", "AWS Glue"], "5.00")
                .with_group(&["source$web", "AWS Lambda"], "1.25")
                .with_group(&["source$", "Amazon Redshift"], "3.50")
                .with_group(&["source$", "AWS Lambda"], "0.10")
                .build(),
        ],
    ]
}

//! Shared test utilities for unit tests
//!
//! Builders for raw Cost Explorer records and a scripted client.
//!
//! Note: Integration tests (in tests/) cannot access this module because it's
//! marked with #[cfg(test)]. They have their own helpers in tests/common/mod.rs.

use crate::error::Result;
use crate::provider::CostQueryClient;
use crate::raw::{
    CostAndUsageRequest, DateInterval, GetCostAndUsageResponse, MetricValue, RawGroup,
    ResultByTime,
};
use crate::types::TimeWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A group with an `UnblendedCost` metric
pub fn group(keys: &[&str], amount: &str, unit: &str) -> RawGroup {
    let mut metrics = HashMap::new();
    metrics.insert(
        "UnblendedCost".to_string(),
        MetricValue {
            amount: Some(amount.to_string()),
            unit: Some(unit.to_string()),
        },
    );
    RawGroup {
        keys: Some(keys.iter().map(|k| k.to_string()).collect()),
        metrics,
    }
}

/// A time bucket with the given groups and an empty total
pub fn bucket(start: &str, end: &str, groups: Vec<RawGroup>) -> ResultByTime {
    ResultByTime {
        time_period: Some(DateInterval {
            start: Some(start.to_string()),
            end: Some(end.to_string()),
        }),
        total: HashMap::new(),
        groups,
        estimated: false,
    }
}

pub fn page(results: Vec<ResultByTime>, token: Option<&str>) -> GetCostAndUsageResponse {
    GetCostAndUsageResponse {
        results_by_time: results,
        next_page_token: token.map(|t| t.to_string()),
        group_definitions: Vec::new(),
        dimension_value_attributes: Vec::new(),
    }
}

pub fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::new(
        NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
        NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
    )
    .unwrap()
}

/// Client that replays scripted responses and records every request
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<GetCostAndUsageResponse>>>,
    requests: Mutex<Vec<CostAndUsageRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<GetCostAndUsageResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CostAndUsageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CostQueryClient for ScriptedClient {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> Result<GetCostAndUsageResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

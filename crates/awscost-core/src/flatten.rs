//! Flattening of Cost Explorer results into a normalized table
//!
//! Each raw `ResultByTime` is first decoded into a typed [`TimeBucket`]
//! (dates parsed, key tuple checked, amount parsed), then every group of the
//! bucket becomes one [`CostRow`]. Row count always equals the sum of group
//! counts over all buckets.
//!
//! # Examples
//!
//! ```
//! use awscost_core::flatten::Flattener;
//! use awscost_core::raw::GetCostAndUsageResponse;
//! use awscost_core::types::{CostMetric, GroupBy};
//!
//! let body = r#"{"ResultsByTime": [{
//!     "TimePeriod": {"Start": "2024-01-01", "End": "2024-02-01"},
//!     "Groups": [{"Keys": ["111222333444", "Amazon S3"],
//!                 "Metrics": {"UnblendedCost": {"Amount": "3.25", "Unit": "USD"}}}]
//! }]}"#;
//! let page: GetCostAndUsageResponse = serde_json::from_str(body).unwrap();
//!
//! let flattener = Flattener::new(GroupBy::account_and_service(), CostMetric::UnblendedCost);
//! let table = flattener.flatten(&page.results_by_time).unwrap();
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.rows[0].dimension2, "Amazon S3");
//! ```

use crate::error::{AwsCostError, Result};
use crate::raw::{MetricValue, RawGroup, ResultByTime};
use crate::types::{CostMetric, CostQuery, CostRow, CostTable, GroupBy};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{debug, warn};

/// A metric amount with its unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricAmount {
    pub amount: Decimal,
    pub unit: String,
}

/// A validated group: `(dimension1, dimension2)` keys and the group's metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub keys: (String, String),
    pub amount: Decimal,
    pub unit: String,
}

/// A validated time bucket
///
/// `estimated` and `total` are decoded but never copied into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub estimated: bool,
    pub total: Option<MetricAmount>,
    pub groups: Vec<Group>,
}

impl TimeBucket {
    /// One row per group, in group order
    pub fn into_rows(self) -> impl Iterator<Item = CostRow> {
        let (start, end) = (self.start, self.end);
        self.groups.into_iter().map(move |group| CostRow {
            start,
            end,
            dimension1: group.keys.0,
            dimension2: group.keys.1,
            amount: group.amount,
            unit: group.unit,
        })
    }
}

/// Turns accumulated `ResultByTime` records into a [`CostTable`]
#[derive(Debug, Clone)]
pub struct Flattener {
    group_by: GroupBy,
    metric: CostMetric,
}

impl Flattener {
    pub fn new(group_by: GroupBy, metric: CostMetric) -> Self {
        Self { group_by, metric }
    }

    /// Flattener matching the grouping and metric of a query
    pub fn for_query(query: &CostQuery) -> Self {
        Self::new(query.group_by.clone(), query.metric)
    }

    /// Flatten all buckets. Any malformed bucket aborts with no rows.
    pub fn flatten(&self, results: &[ResultByTime]) -> Result<CostTable> {
        let expected: usize = results.iter().map(|r| r.groups.len()).sum();
        let mut rows = Vec::with_capacity(expected);

        for (index, raw) in results.iter().enumerate() {
            let bucket = self.decode_bucket(index, raw)?;

            if bucket.groups.is_empty() {
                match &bucket.total {
                    Some(total) if !total.amount.is_zero() => warn!(
                        "Bucket {}..{} has no groups; dropping its total of {} {}",
                        bucket.start, bucket.end, total.amount, total.unit
                    ),
                    _ => debug!("Bucket {}..{} has no groups", bucket.start, bucket.end),
                }
            }

            rows.extend(bucket.into_rows());
        }

        debug!(
            "Flattened {} buckets into {} rows",
            results.len(),
            rows.len()
        );
        Ok(CostTable::new(&self.group_by, rows))
    }

    /// Decode one raw bucket into its typed form
    pub fn decode_bucket(&self, index: usize, raw: &ResultByTime) -> Result<TimeBucket> {
        let period = raw.time_period.as_ref().ok_or_else(|| {
            AwsCostError::malformed(format!("result {index}: missing TimePeriod"))
        })?;
        let start = parse_date(period.start.as_deref(), "Start", index)?;
        let end = parse_date(period.end.as_deref(), "End", index)?;

        // Totals are optional; an unparsable total is ignored.
        let total = raw
            .total
            .get(self.metric.as_str())
            .and_then(|value| parse_metric(value, self.metric).ok());

        let groups = raw
            .groups
            .iter()
            .enumerate()
            .map(|(group_index, group)| self.decode_group(index, group_index, group))
            .collect::<Result<Vec<_>>>()?;

        Ok(TimeBucket {
            start,
            end,
            estimated: raw.estimated,
            total,
            groups,
        })
    }

    fn decode_group(&self, index: usize, group_index: usize, raw: &RawGroup) -> Result<Group> {
        let context = || format!("result {index}, group {group_index}");

        let keys = raw
            .keys
            .as_ref()
            .ok_or_else(|| AwsCostError::malformed(format!("{}: missing Keys", context())))?;

        let arity = self.group_by.arity();
        if keys.len() != arity {
            return Err(AwsCostError::malformed(format!(
                "{}: expected {} group keys, got {} ({:?})",
                context(),
                arity,
                keys.len(),
                keys
            )));
        }
        let dimension1 = keys[0].clone();
        let dimension2 = keys.get(1).cloned().unwrap_or_default();

        let value = raw.metrics.get(self.metric.as_str()).ok_or_else(|| {
            AwsCostError::malformed(format!("{}: missing metric {}", context(), self.metric))
        })?;
        let metric = parse_metric(value, self.metric)
            .map_err(|e| AwsCostError::malformed(format!("{}: {}", context(), e)))?;

        Ok(Group {
            keys: (dimension1, dimension2),
            amount: metric.amount,
            unit: metric.unit,
        })
    }
}

fn parse_metric(value: &MetricValue, metric: CostMetric) -> std::result::Result<MetricAmount, String> {
    let raw_amount = value
        .amount
        .as_deref()
        .ok_or_else(|| format!("{metric} has no Amount"))?;
    let amount = parse_amount(raw_amount)
        .ok_or_else(|| format!("{metric} amount {raw_amount:?} is not a number"))?;
    let unit = value
        .unit
        .clone()
        .ok_or_else(|| format!("{metric} has no Unit"))?;
    Ok(MetricAmount { amount, unit })
}

/// Parse an API amount string such as `"12.50"` or `"1.2E-7"`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Dates are `YYYY-MM-DD`, or RFC 3339 timestamps for hourly buckets
fn parse_date(raw: Option<&str>, field: &str, index: usize) -> Result<NaiveDate> {
    let raw = raw.ok_or_else(|| {
        AwsCostError::malformed(format!("result {index}: missing TimePeriod.{field}"))
    })?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| {
            AwsCostError::malformed(format!(
                "result {index}: TimePeriod.{field} {raw:?} is not a date"
            ))
        })
}

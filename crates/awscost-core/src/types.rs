//! Core domain types for awscost
//!
//! Query parameters (time window, granularity, metric, grouping) and the
//! normalized cost table produced by flattening a Cost Explorer response.

use crate::error::{AwsCostError, Result};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Size of the time buckets requested from Cost Explorer
///
/// # Examples
/// ```
/// use awscost_core::types::Granularity;
/// use std::str::FromStr;
///
/// assert_eq!(Granularity::from_str("daily").unwrap(), Granularity::Daily);
/// assert_eq!(Granularity::Monthly.to_string(), "MONTHLY");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    #[default]
    Daily,
    Monthly,
    Hourly,
}

impl Granularity {
    /// Wire name used by the Cost Explorer API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Monthly => "MONTHLY",
            Self::Hourly => "HOURLY",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "hourly" => Ok(Self::Hourly),
            _ => Err(format!(
                "Invalid granularity: {s} (expected daily, monthly or hourly)"
            )),
        }
    }
}

/// Cost metric to request
///
/// Accepts either the API name (`UnblendedCost`) or a kebab-case form
/// (`unblended-cost`) when parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CostMetric {
    #[default]
    UnblendedCost,
    BlendedCost,
    AmortizedCost,
    NetUnblendedCost,
    NetAmortizedCost,
    UsageQuantity,
}

impl CostMetric {
    const ALL: [CostMetric; 6] = [
        Self::UnblendedCost,
        Self::BlendedCost,
        Self::AmortizedCost,
        Self::NetUnblendedCost,
        Self::NetAmortizedCost,
        Self::UsageQuantity,
    ];

    /// Wire name used by the Cost Explorer API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnblendedCost => "UnblendedCost",
            Self::BlendedCost => "BlendedCost",
            Self::AmortizedCost => "AmortizedCost",
            Self::NetUnblendedCost => "NetUnblendedCost",
            Self::NetAmortizedCost => "NetAmortizedCost",
            Self::UsageQuantity => "UsageQuantity",
        }
    }
}

impl fmt::Display for CostMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.replace('-', "").to_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("Invalid cost metric: {s}"))
    }
}

/// Fixed Cost Explorer dimensions that can be used for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    LinkedAccount,
    Service,
    Region,
    UsageType,
}

impl Dimension {
    /// Wire key used by the Cost Explorer API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkedAccount => "LINKED_ACCOUNT",
            Self::Service => "SERVICE",
            Self::Region => "REGION",
            Self::UsageType => "USAGE_TYPE",
        }
    }

    /// Column name used for this dimension in the normalized table
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::LinkedAccount => "account",
            Self::Service => "resource",
            Self::Region => "region",
            Self::UsageType => "usage_type",
        }
    }
}

/// One grouping selector: a cost allocation tag or a fixed dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupSelector {
    Tag(String),
    Dimension(Dimension),
}

impl GroupSelector {
    /// `Type` field of the wire `GroupBy` entry
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tag(_) => "TAG",
            Self::Dimension(_) => "DIMENSION",
        }
    }

    /// `Key` field of the wire `GroupBy` entry
    pub fn key(&self) -> &str {
        match self {
            Self::Tag(key) => key,
            Self::Dimension(dimension) => dimension.as_str(),
        }
    }

    /// Column name for values of this selector (the tag key for tags)
    pub fn column_name(&self) -> &str {
        match self {
            Self::Tag(key) => key,
            Self::Dimension(dimension) => dimension.column_name(),
        }
    }
}

/// Grouping definition: one or two selectors
///
/// # Examples
/// ```
/// use awscost_core::types::GroupBy;
///
/// let group_by = GroupBy::tag_and_service("source");
/// assert_eq!(group_by.dimension1_name(), "source");
/// assert_eq!(group_by.dimension2_name(), "resource");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupBy(Vec<GroupSelector>);

impl GroupBy {
    /// Group by a single selector
    pub fn single(selector: GroupSelector) -> Self {
        Self(vec![selector])
    }

    /// Group by two selectors; keys come back in this order
    pub fn pair(first: GroupSelector, second: GroupSelector) -> Self {
        Self(vec![first, second])
    }

    /// Linked account + service, the default breakdown
    pub fn account_and_service() -> Self {
        Self::pair(
            GroupSelector::Dimension(Dimension::LinkedAccount),
            GroupSelector::Dimension(Dimension::Service),
        )
    }

    /// Tag value + service
    pub fn tag_and_service(key: impl Into<String>) -> Self {
        Self::pair(
            GroupSelector::Tag(key.into()),
            GroupSelector::Dimension(Dimension::Service),
        )
    }

    pub fn selectors(&self) -> &[GroupSelector] {
        &self.0
    }

    /// Number of keys every returned group must carry
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn dimension1_name(&self) -> &str {
        self.0[0].column_name()
    }

    /// Empty for single-selector groupings
    pub fn dimension2_name(&self) -> &str {
        self.0.get(1).map(|s| s.column_name()).unwrap_or("")
    }
}

/// Query time window; `end` is exclusive as in Cost Explorer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Create a window, rejecting empty or inverted ranges
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start >= end {
            return Err(AwsCostError::InvalidArgument(format!(
                "time window start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days` days leading up to `today`
    ///
    /// # Examples
    /// ```
    /// use awscost_core::types::TimeWindow;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
    /// let window = TimeWindow::last_days(30, today).unwrap();
    /// assert_eq!(window.start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    /// assert_eq!(window.end, today);
    /// ```
    pub fn last_days(days: u32, today: NaiveDate) -> Result<Self> {
        let start = today.checked_sub_days(Days::new(u64::from(days))).ok_or_else(|| {
            AwsCostError::InvalidArgument(format!("{days} days before {today} is out of range"))
        })?;
        Self::new(start, today)
    }

    /// Format a date the way the API expects it
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Format a date as midnight UTC, as hourly queries require
    pub fn format_timestamp(date: &NaiveDate) -> String {
        date.format("%Y-%m-%dT00:00:00Z").to_string()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Parameters of one cost-and-usage query
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    pub window: TimeWindow,
    pub granularity: Granularity,
    pub metric: CostMetric,
    pub group_by: GroupBy,
}

impl CostQuery {
    /// Daily unblended cost for the window, grouped as given
    pub fn new(window: TimeWindow, group_by: GroupBy) -> Self {
        Self {
            window,
            granularity: Granularity::default(),
            metric: CostMetric::default(),
            group_by,
        }
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_metric(mut self, metric: CostMetric) -> Self {
        self.metric = metric;
        self
    }
}

/// One normalized row: a single group within a single time bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dimension1: String,
    pub dimension2: String,
    pub amount: Decimal,
    pub unit: String,
}

/// The flattened result of a query
///
/// Column names record what `dimension1`/`dimension2` hold, e.g. `account`
/// and `resource` for an account + service breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTable {
    pub dimension1_name: String,
    pub dimension2_name: String,
    pub rows: Vec<CostRow>,
    /// Display names for `dimension1` values, e.g. account ID → account name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimension1_labels: BTreeMap<String, String>,
}

impl CostTable {
    pub fn new(group_by: &GroupBy, rows: Vec<CostRow>) -> Self {
        Self {
            dimension1_name: group_by.dimension1_name().to_string(),
            dimension2_name: group_by.dimension2_name().to_string(),
            rows,
            dimension1_labels: BTreeMap::new(),
        }
    }

    pub fn with_dimension1_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.dimension1_labels = labels;
        self
    }

    pub fn dimension1_label(&self, value: &str) -> Option<&str> {
        self.dimension1_labels.get(value).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

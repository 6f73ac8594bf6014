//! Filtering module for cost rows
//!
//! This module narrows a flattened [`CostTable`](awscost_core::CostTable)
//! down to the rows a report is interested in: a date range on the bucket
//! start, allowed values for either dimension, tag presence and a minimum
//! amount.
//!
//! # Examples
//!
//! ```
//! use awscost::filters::{RowFilter, TagPresence};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! // Month-to-date rows for tagged resources costing more than $1
//! let filter = RowFilter::new()
//!     .with_since(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .with_tag_presence(TagPresence::Tagged)
//!     .with_min_amount(Decimal::ONE);
//! ```

use awscost_core::CostRow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Whether a row's tag value must be set
///
/// Only meaningful when the first grouping selector is a tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPresence {
    #[default]
    Any,
    /// Rows whose tag value is non-empty
    Tagged,
    /// Rows whose tag value is empty
    Untagged,
}

/// Value of a tag group key
///
/// Cost Explorer reports tag keys as `"<key>$<value>"`, with an empty value
/// for untagged resources.
///
/// # Examples
/// ```
/// use awscost::filters::tag_value;
///
/// assert_eq!(tag_value("source$web"), "web");
/// assert_eq!(tag_value("source$"), "");
/// assert_eq!(tag_value("already-bare"), "already-bare");
/// ```
pub fn tag_value(raw: &str) -> &str {
    raw.split_once('$').map_or(raw, |(_, value)| value)
}

/// Filter configuration for cost rows
///
/// All filters are optional and combine with AND.
#[derive(Debug, Default, Clone)]
pub struct RowFilter {
    /// Earliest bucket start (inclusive)
    pub since_date: Option<NaiveDate>,
    /// Latest bucket start (inclusive)
    pub until_date: Option<NaiveDate>,
    pub dimension1: Option<BTreeSet<String>>,
    pub dimension2: Option<BTreeSet<String>>,
    pub tag_presence: TagPresence,
    /// Rows must cost strictly more than this
    pub min_amount: Option<Decimal>,
}

impl RowFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Only keep rows whose first dimension is one of `values`
    pub fn with_dimension1<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension1 = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Also accept `dimension1` values whose label is in the allowed set
    ///
    /// With `labels` mapping account IDs to account names, an allowed set of
    /// names then matches rows keyed by ID. No-op without a `dimension1` set.
    pub fn with_dimension1_labels(mut self, labels: &BTreeMap<String, String>) -> Self {
        if let Some(allowed) = &mut self.dimension1 {
            let aliases: Vec<String> = labels
                .iter()
                .filter(|(_, label)| allowed.contains(*label))
                .map(|(value, _)| value.clone())
                .collect();
            allowed.extend(aliases);
        }
        self
    }

    /// Only keep rows whose second dimension is one of `values`
    pub fn with_dimension2<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimension2 = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_tag_presence(mut self, presence: TagPresence) -> Self {
        self.tag_presence = presence;
        self
    }

    pub fn with_min_amount(mut self, amount: Decimal) -> Self {
        self.min_amount = Some(amount);
        self
    }

    /// Check if a row passes the filter
    pub fn matches(&self, row: &CostRow) -> bool {
        if let Some(since) = &self.since_date
            && row.start < *since
        {
            return false;
        }

        if let Some(until) = &self.until_date
            && row.start > *until
        {
            return false;
        }

        if let Some(allowed) = &self.dimension1
            && !allowed.contains(&row.dimension1)
        {
            return false;
        }

        if let Some(allowed) = &self.dimension2
            && !allowed.contains(&row.dimension2)
        {
            return false;
        }

        let tagged = !tag_value(&row.dimension1).is_empty();
        match self.tag_presence {
            TagPresence::Any => {}
            TagPresence::Tagged if !tagged => return false,
            TagPresence::Untagged if tagged => return false,
            _ => {}
        }

        if let Some(min) = &self.min_amount
            && row.amount <= *min
        {
            return false;
        }

        true
    }

    /// Keep only the matching rows
    pub fn apply(&self, rows: impl IntoIterator<Item = CostRow>) -> Vec<CostRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

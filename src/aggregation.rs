//! Aggregation module for summarizing cost rows
//!
//! This module rolls flattened cost rows up into the views the reports
//! print: cost per period and key, cost per dimension pair, and the most
//! expensive keys. All sums are exact `Decimal` arithmetic and results are
//! ordered deterministically through `BTreeMap`s.
//!
//! Rows with different units are never summed together; the unit is part
//! of every grouping key.
//!
//! # Examples
//!
//! ```
//! use awscost::aggregation::{Aggregator, GroupKey, Totals};
//! use awscost_core::CostRow;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let rows = vec![CostRow {
//!     start,
//!     end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
//!     dimension1: "111111111111".to_string(),
//!     dimension2: "Amazon S3".to_string(),
//!     amount: Decimal::new(150, 2),
//!     unit: "USD".to_string(),
//! }];
//!
//! // Cost per account per period
//! let by_account = Aggregator::by_period(&rows, GroupKey::Dimension1);
//! assert_eq!(by_account[0].key, "111111111111");
//!
//! let totals = Totals::from_rows(&rows);
//! assert_eq!(totals.amount, Decimal::new(150, 2));
//! ```

use awscost_core::CostRow;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Which dimension of a row to group on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Dimension1,
    Dimension2,
}

impl GroupKey {
    fn pick<'a>(&self, row: &'a CostRow) -> &'a str {
        match self {
            GroupKey::Dimension1 => &row.dimension1,
            GroupKey::Dimension2 => &row.dimension2,
        }
    }
}

/// Summed cost of one key within one period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCost {
    /// Start of the time bucket
    pub start: NaiveDate,
    /// Account, service or tag value depending on the grouping
    pub key: String,
    pub amount: Decimal,
    pub unit: String,
}

/// Summed cost of one (dimension1, dimension2) pair across all periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCost {
    pub dimension1: String,
    pub dimension2: String,
    pub amount: Decimal,
    pub unit: String,
}

/// Summed cost of one key across all periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCost {
    pub key: String,
    pub amount: Decimal,
    pub unit: String,
}

/// Stateless roll-ups over cost rows
pub struct Aggregator;

impl Aggregator {
    /// Sum rows per bucket start and key
    ///
    /// Results are ordered by start, then key.
    pub fn by_period(rows: &[CostRow], key: GroupKey) -> Vec<PeriodCost> {
        let mut period_map: BTreeMap<(NaiveDate, &str, &str), Decimal> = BTreeMap::new();

        for row in rows {
            *period_map
                .entry((row.start, key.pick(row), row.unit.as_str()))
                .or_default() += row.amount;
        }

        period_map
            .into_iter()
            .map(|((start, key, unit), amount)| PeriodCost {
                start,
                key: key.to_string(),
                amount,
                unit: unit.to_string(),
            })
            .collect()
    }

    /// Sum rows per (dimension1, dimension2) pair
    pub fn by_pair(rows: &[CostRow]) -> Vec<PairCost> {
        let mut pair_map: BTreeMap<(&str, &str, &str), Decimal> = BTreeMap::new();

        for row in rows {
            *pair_map
                .entry((
                    row.dimension1.as_str(),
                    row.dimension2.as_str(),
                    row.unit.as_str(),
                ))
                .or_default() += row.amount;
        }

        pair_map
            .into_iter()
            .map(|((dimension1, dimension2, unit), amount)| PairCost {
                dimension1: dimension1.to_string(),
                dimension2: dimension2.to_string(),
                amount,
                unit: unit.to_string(),
            })
            .collect()
    }

    /// The `n` most expensive keys, most expensive first
    ///
    /// Equal amounts are ordered by key name.
    pub fn top(rows: &[CostRow], key: GroupKey, n: usize) -> Vec<KeyCost> {
        let mut key_map: BTreeMap<(&str, &str), Decimal> = BTreeMap::new();

        for row in rows {
            *key_map
                .entry((key.pick(row), row.unit.as_str()))
                .or_default() += row.amount;
        }

        let mut ranked: Vec<KeyCost> = key_map
            .into_iter()
            .map(|((key, unit), amount)| KeyCost {
                key: key.to_string(),
                amount,
                unit: unit.to_string(),
            })
            .collect();

        ranked.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.key.cmp(&b.key)));
        ranked.truncate(n);
        ranked
    }

    /// Sort period costs most expensive first, keeping period/key order for ties
    pub fn sort_by_amount_desc(data: &mut [PeriodCost]) {
        data.sort_by(|a, b| match b.amount.cmp(&a.amount) {
            Ordering::Equal => (a.start, &a.key).cmp(&(b.start, &b.key)),
            other => other,
        });
    }
}

/// Calculate totals from aggregated data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub amount: Decimal,
    /// Shared unit of everything summed; `None` when empty or mixed
    pub unit: Option<String>,
    pub count: usize,
}

impl Totals {
    fn accumulate<'a>(items: impl Iterator<Item = (Decimal, &'a str)>) -> Self {
        let mut totals = Self::default();
        let mut unit: Option<&str> = None;
        let mut mixed = false;

        for (amount, item_unit) in items {
            totals.amount += amount;
            totals.count += 1;
            match unit {
                None => unit = Some(item_unit),
                Some(seen) if seen != item_unit => mixed = true,
                _ => {}
            }
        }

        if !mixed {
            totals.unit = unit.map(str::to_string);
        }
        totals
    }

    pub fn from_rows(rows: &[CostRow]) -> Self {
        Self::accumulate(rows.iter().map(|r| (r.amount, r.unit.as_str())))
    }

    pub fn from_periods(data: &[PeriodCost]) -> Self {
        Self::accumulate(data.iter().map(|d| (d.amount, d.unit.as_str())))
    }

    pub fn from_pairs(data: &[PairCost]) -> Self {
        Self::accumulate(data.iter().map(|d| (d.amount, d.unit.as_str())))
    }

    pub fn from_keys(data: &[KeyCost]) -> Self {
        Self::accumulate(data.iter().map(|d| (d.amount, d.unit.as_str())))
    }
}

//! Output formatting module for awscost
//!
//! This module provides formatters for displaying cost data in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use awscost::aggregation::{Aggregator, GroupKey, Totals};
//! use awscost::output::get_formatter;
//! use awscost_core::CostRow;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let rows = vec![CostRow {
//!     start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     end: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
//!     dimension1: "111111111111".to_string(),
//!     dimension2: "Amazon S3".to_string(),
//!     amount: Decimal::new(1234, 2),
//!     unit: "USD".to_string(),
//! }];
//!
//! let data = Aggregator::by_period(&rows, GroupKey::Dimension1);
//! let totals = Totals::from_periods(&data);
//!
//! // Table formatter for human-readable output
//! let formatter = get_formatter(false);
//! assert!(formatter.format_by_period("account", &data, &totals).contains("$12.34"));
//!
//! // JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true);
//! println!("{}", json_formatter.format_by_period("account", &data, &totals));
//! ```

use crate::aggregation::{KeyCost, PairCost, PeriodCost, Totals};
use awscost_core::CostTable;
use prettytable::{Cell, Row, Table, format, row};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

/// Trait for output formatters
///
/// One method per report shape. Column names (`account`, `resource`, a tag
/// key, ...) are passed in so the same formatter serves every grouping.
pub trait OutputFormatter {
    /// Format the flattened cost table
    fn format_rows(&self, table: &CostTable, totals: &Totals) -> String;

    /// Format cost per period and key
    fn format_by_period(&self, key_name: &str, data: &[PeriodCost], totals: &Totals) -> String;

    /// Format cost per dimension pair
    fn format_by_pair(
        &self,
        names: (&str, &str),
        data: &[PairCost],
        totals: &Totals,
    ) -> String;

    /// Format a ranking of keys by cost
    fn format_top(&self, key_name: &str, data: &[KeyCost], totals: &Totals) -> String;
}

/// Table formatter for human-readable output
///
/// Produces ASCII tables suitable for terminal display. USD amounts are
/// shown with a dollar sign and two decimals.
pub struct TableFormatter;

impl TableFormatter {
    /// Format an amount in its unit
    fn format_amount(amount: Decimal, unit: &str) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if unit == "USD" {
            format!("${rounded:.2}")
        } else {
            format!("{rounded:.2} {unit}")
        }
    }

    fn format_total(totals: &Totals) -> String {
        Self::format_amount(totals.amount, totals.unit.as_deref().unwrap_or(""))
            .trim_end()
            .to_string()
    }

    /// Capitalize a column name for a table header
    fn title(name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    /// Create a totals row padded to the table width
    fn format_totals_row(totals: &Totals, leading: usize) -> Row {
        let mut totals_row = row![b -> "TOTAL"];
        for _ in 1..leading {
            totals_row.add_cell(Cell::new(""));
        }
        totals_row.add_cell(Cell::new(&Self::format_total(totals)).style_spec("b"));
        totals_row
    }
}

impl OutputFormatter for TableFormatter {
    fn format_rows(&self, table: &CostTable, totals: &Totals) -> String {
        let mut out = Self::new_table();
        out.set_titles(row![
            b -> "Start",
            b -> "End",
            b -> Self::title(&table.dimension1_name),
            b -> Self::title(&table.dimension2_name),
            b -> "Amount"
        ]);

        for cost in &table.rows {
            out.add_row(row![
                cost.start.format("%Y-%m-%d"),
                cost.end.format("%Y-%m-%d"),
                cost.dimension1,
                cost.dimension2,
                r -> Self::format_amount(cost.amount, &cost.unit)
            ]);
        }

        out.add_row(Self::format_totals_row(totals, 4));
        out.to_string()
    }

    fn format_by_period(&self, key_name: &str, data: &[PeriodCost], totals: &Totals) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Period", b -> Self::title(key_name), b -> "Amount"]);

        for cost in data {
            table.add_row(row![
                cost.start.format("%Y-%m-%d"),
                cost.key,
                r -> Self::format_amount(cost.amount, &cost.unit)
            ]);
        }

        table.add_row(Self::format_totals_row(totals, 2));
        table.to_string()
    }

    fn format_by_pair(
        &self,
        names: (&str, &str),
        data: &[PairCost],
        totals: &Totals,
    ) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> Self::title(names.0),
            b -> Self::title(names.1),
            b -> "Amount"
        ]);

        for cost in data {
            table.add_row(row![
                cost.dimension1,
                cost.dimension2,
                r -> Self::format_amount(cost.amount, &cost.unit)
            ]);
        }

        table.add_row(Self::format_totals_row(totals, 2));
        table.to_string()
    }

    fn format_top(&self, key_name: &str, data: &[KeyCost], totals: &Totals) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "#", b -> Self::title(key_name), b -> "Amount"]);

        for (rank, cost) in data.iter().enumerate() {
            table.add_row(row![
                r -> rank + 1,
                cost.key,
                r -> Self::format_amount(cost.amount, &cost.unit)
            ]);
        }

        table.add_row(Self::format_totals_row(totals, 2));
        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// Amounts are emitted as JSON numbers and dates as `YYYY-MM-DD` strings.
pub struct JsonFormatter;

impl JsonFormatter {
    fn totals_json(totals: &Totals) -> serde_json::Value {
        json!({
            "amount": totals.amount,
            "unit": totals.unit,
            "count": totals.count,
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_rows(&self, table: &CostTable, totals: &Totals) -> String {
        let output = json!({
            "columns": [
                "start",
                "end",
                table.dimension1_name,
                table.dimension2_name,
                "amount",
                "unit"
            ],
            "rows": table.rows.iter().map(|r| json!({
                "start": r.start.format("%Y-%m-%d").to_string(),
                "end": r.end.format("%Y-%m-%d").to_string(),
                "dimension1": r.dimension1,
                "dimension2": r.dimension2,
                "amount": r.amount,
                "unit": r.unit,
            })).collect::<Vec<_>>(),
            "totals": Self::totals_json(totals),
        });

        serde_json::to_string_pretty(&output).unwrap()
    }

    fn format_by_period(&self, key_name: &str, data: &[PeriodCost], totals: &Totals) -> String {
        let output = json!({
            "key": key_name,
            "periods": data.iter().map(|p| json!({
                "start": p.start.format("%Y-%m-%d").to_string(),
                "key": p.key,
                "amount": p.amount,
                "unit": p.unit,
            })).collect::<Vec<_>>(),
            "totals": Self::totals_json(totals),
        });

        serde_json::to_string_pretty(&output).unwrap()
    }

    fn format_by_pair(
        &self,
        names: (&str, &str),
        data: &[PairCost],
        totals: &Totals,
    ) -> String {
        let output = json!({
            "columns": [names.0, names.1],
            "pairs": data.iter().map(|p| json!({
                "dimension1": p.dimension1,
                "dimension2": p.dimension2,
                "amount": p.amount,
                "unit": p.unit,
            })).collect::<Vec<_>>(),
            "totals": Self::totals_json(totals),
        });

        serde_json::to_string_pretty(&output).unwrap()
    }

    fn format_top(&self, key_name: &str, data: &[KeyCost], totals: &Totals) -> String {
        let output = json!({
            "key": key_name,
            "top": data.iter().enumerate().map(|(rank, k)| json!({
                "rank": rank + 1,
                "key": k.key,
                "amount": k.amount,
                "unit": k.unit,
            })).collect::<Vec<_>>(),
            "totals": Self::totals_json(totals),
        });

        serde_json::to_string_pretty(&output).unwrap()
    }
}

/// Get the appropriate formatter based on output preference
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{Aggregator, GroupKey};
    use awscost_core::{CostRow, GroupBy};
    use chrono::NaiveDate;

    fn sample_table() -> CostTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let rows = vec![
            CostRow {
                start,
                end,
                dimension1: "111111111111".to_string(),
                dimension2: "Amazon S3".to_string(),
                amount: Decimal::new(1234, 2),
                unit: "USD".to_string(),
            },
            CostRow {
                start,
                end,
                dimension1: "222222222222".to_string(),
                dimension2: "AWS Lambda".to_string(),
                amount: Decimal::new(5, 1),
                unit: "USD".to_string(),
            },
        ];
        CostTable::new(&GroupBy::account_and_service(), rows)
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(
            TableFormatter::format_amount(Decimal::new(12345, 3), "USD"),
            "$12.35"
        );
        assert_eq!(TableFormatter::format_amount(Decimal::ZERO, "USD"), "$0.00");
        assert_eq!(
            TableFormatter::format_amount(Decimal::new(1000, 0), "USD"),
            "$1000.00"
        );
        assert_eq!(
            TableFormatter::format_amount(Decimal::new(1, 3), "USD"),
            "$0.00"
        );
        assert_eq!(
            TableFormatter::format_amount(Decimal::new(15, 1), "Hrs"),
            "1.50 Hrs"
        );
    }

    #[test]
    fn test_title() {
        assert_eq!(TableFormatter::title("account"), "Account");
        assert_eq!(TableFormatter::title("source"), "Source");
        assert_eq!(TableFormatter::title(""), "");
    }

    #[test]
    fn test_table_rows() {
        let table = sample_table();
        let totals = Totals::from_rows(&table.rows);
        let output = TableFormatter.format_rows(&table, &totals);

        assert!(output.contains("Account"));
        assert!(output.contains("Resource"));
        assert!(output.contains("2024-01-01"));
        assert!(output.contains("$12.34"));
        assert!(output.contains("$0.50"));
        assert!(output.contains("TOTAL"));
        assert!(output.contains("$12.84"));
    }

    #[test]
    fn test_table_top() {
        let table = sample_table();
        let data = Aggregator::top(&table.rows, GroupKey::Dimension2, 10);
        let output = TableFormatter.format_top("resource", &data, &Totals::from_keys(&data));

        let s3 = output.find("Amazon S3").unwrap();
        let lambda = output.find("AWS Lambda").unwrap();
        assert!(s3 < lambda);
    }

    #[test]
    fn test_json_by_period() {
        let table = sample_table();
        let data = Aggregator::by_period(&table.rows, GroupKey::Dimension1);
        let totals = Totals::from_periods(&data);
        let output = JsonFormatter.format_by_period("account", &data, &totals);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["key"], "account");
        assert_eq!(parsed["periods"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["periods"][0]["start"], "2024-01-01");
        assert_eq!(parsed["periods"][0]["amount"], 12.34);
        assert_eq!(parsed["totals"]["unit"], "USD");
        assert_eq!(parsed["totals"]["count"], 2);
    }

    #[test]
    fn test_json_rows_and_pairs() {
        let table = sample_table();
        let totals = Totals::from_rows(&table.rows);

        let parsed: serde_json::Value =
            serde_json::from_str(&JsonFormatter.format_rows(&table, &totals)).unwrap();
        assert_eq!(parsed["columns"][2], "account");
        assert_eq!(parsed["columns"][3], "resource");
        assert_eq!(parsed["rows"][1]["dimension2"], "AWS Lambda");
        assert_eq!(parsed["rows"][1]["amount"], 0.5);

        let pairs = Aggregator::by_pair(&table.rows);
        let parsed: serde_json::Value = serde_json::from_str(&JsonFormatter.format_by_pair(
            ("account", "resource"),
            &pairs,
            &Totals::from_pairs(&pairs),
        ))
        .unwrap();
        assert_eq!(parsed["pairs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_get_formatter() {
        let table = sample_table();
        let totals = Totals::from_rows(&table.rows);

        let json_formatter = get_formatter(true);
        assert!(json_formatter.format_rows(&table, &totals).contains("\"rows\""));

        let table_formatter = get_formatter(false);
        assert!(table_formatter.format_rows(&table, &totals).contains("TOTAL"));
    }
}

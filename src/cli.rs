//! CLI interface for awscost
//!
//! This module defines the command-line interface using clap. Every report
//! is a subcommand; the query window, granularity, metric and AWS settings
//! are global flags that can appear anywhere on the command line.
//!
//! # Example
//!
//! ```bash
//! # Cost per account per month over the last year
//! awscost accounts
//!
//! # Daily rows for January 2024 grouped by the `team` tag
//! awscost rows --by-tag --tag team --since 2024-01-01 --until 2024-01-31
//!
//! # Yesterday's untagged services as JSON
//! awscost untagged --json
//! ```

use awscost_core::error::{AwsCostError, Result};
use awscost_core::types::{CostMetric, Granularity};
use awscost_explorer::config::DEFAULT_REGION;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Tag key used by the tag reports unless `--tag` says otherwise
pub const DEFAULT_TAG_KEY: &str = "source";

/// Summarize AWS Cost Explorer data by account, service and tag
#[derive(Parser, Debug, Clone)]
#[command(name = "awscost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// AWS profile to load credentials from
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// AWS region of the Cost Explorer endpoint
    #[arg(long, env = "AWS_REGION", default_value = DEFAULT_REGION, global = true)]
    pub region: String,

    /// Override the Cost Explorer endpoint URL
    #[arg(long, env = "AWSCOST_ENDPOINT", global = true, hide = true)]
    pub endpoint: Option<String>,

    /// Number of days to query, ending today (default depends on the report)
    #[arg(long, short = 'd', global = true)]
    pub days: Option<u32>,

    /// Query start date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Query end date, inclusive (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Bucket size: daily, monthly or hourly (default depends on the report)
    #[arg(long, short = 'g', global = true)]
    pub granularity: Option<Granularity>,

    /// Cost metric to request (e.g. unblended-cost, amortized-cost)
    #[arg(long, default_value = "UnblendedCost", global = true)]
    pub metric: CostMetric,

    /// Tag key for tag-based reports
    #[arg(long, default_value = DEFAULT_TAG_KEY, global = true)]
    pub tag: String,

    /// Report to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available reports
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the flattened cost table
    Rows {
        /// Group by the `--tag` key and service instead of account and service
        #[arg(long)]
        by_tag: bool,
    },

    /// Cost per account per period
    Accounts,

    /// Cost per service per period
    Services,

    /// Most expensive services month-to-date across all accounts
    Top {
        /// Number of services to show
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,
    },

    /// Month-to-date cost per account and service
    AccountServices {
        /// Only include these accounts, by account ID or account name (repeatable)
        #[arg(long = "account", short = 'a')]
        accounts: Vec<String>,

        /// Only include rows costing more than this
        #[arg(long, default_value = "1")]
        min_amount: Decimal,
    },

    /// Services without a value for the `--tag` key since yesterday
    Untagged,

    /// Month-to-date cost per `--tag` value and service
    Tags,
}

impl Command {
    /// Whether the report groups by the `--tag` key rather than account
    pub fn groups_by_tag(&self) -> bool {
        matches!(
            self,
            Command::Rows { by_tag: true } | Command::Untagged | Command::Tags
        )
    }
}

/// Parse date filter from string
///
/// Accepts dates in YYYY-MM-DD or YYYY-MM format.
/// For YYYY-MM format, defaults to the first day of the month.
///
/// # Example
///
/// ```
/// use awscost::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-01-15").unwrap();
/// assert_eq!(date.year(), 2024);
/// assert_eq!(date.day(), 15);
///
/// let date = parse_date_filter("2024-01").unwrap();
/// assert_eq!(date.month(), 1);
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<chrono::NaiveDate> {
    if let Ok(date) = chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some((year, month)) = date_str.split_once('-') else {
        return Err(AwsCostError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )));
    };

    let year = year
        .parse::<i32>()
        .map_err(|_| AwsCostError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
    let month = month
        .parse::<u32>()
        .map_err(|_| AwsCostError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

    if !(1..=12).contains(&month) {
        return Err(AwsCostError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }

    chrono::NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AwsCostError::InvalidDate(format!("Invalid date: {date_str}")))
}

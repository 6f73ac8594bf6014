//! awscost - Summarize AWS Cost Explorer data by account, service and tag
//!
//! This library provides functionality to:
//! - Fetch every page of a `GetCostAndUsage` query
//! - Flatten grouped results into `(start, end, dimension1, dimension2, amount, unit)` rows
//! - Filter and aggregate rows into per-period, per-pair and top-N views
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use awscost::{
//!     aggregation::{Aggregator, GroupKey},
//!     filters::RowFilter,
//! };
//! use awscost_core::{paginator::Paginator, CostQuery, GroupBy, TimeWindow};
//! use awscost_explorer::{AwsCredentials, CostExplorerClient, ExplorerConfig};
//! use chrono::Utc;
//!
//! #[tokio::main]
//! async fn main() -> awscost::Result<()> {
//!     let config = ExplorerConfig::new(AwsCredentials::Profile { name: "prod".into() });
//!     let paginator = Paginator::new(CostExplorerClient::new(config)?);
//!
//!     let today = Utc::now().date_naive();
//!     let query = CostQuery::new(TimeWindow::last_days(30, today)?, GroupBy::account_and_service());
//!     let table = paginator.fetch_table(&query).await?;
//!
//!     let rows = RowFilter::new().apply(table.rows);
//!     let by_service = Aggregator::by_period(&rows, GroupKey::Dimension2);
//!     println!("{} service/day pairs", by_service.len());
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod filters;
pub mod output;
pub mod report;

pub use awscost_core::error;

// Re-export commonly used types
pub use awscost_core::{AwsCostError, CostRow, CostTable, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

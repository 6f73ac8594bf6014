//! Core types, pagination and flattening for awscost
//!
//! This crate holds everything between the cost query wire format and the
//! normalized cost table: domain types, the error type, the
//! `CostQueryClient` seam, the paginator and the flattener. It does no
//! network I/O of its own.

pub mod error;
pub mod flatten;
pub mod paginator;
pub mod provider;
pub mod raw;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{AwsCostError, Result};
pub use types::{
    CostMetric, CostQuery, CostRow, CostTable, Dimension, Granularity, GroupBy, GroupSelector,
    TimeWindow,
};

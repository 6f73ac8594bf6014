//! AWS Cost Explorer client for awscost
//!
//! Implements [`awscost_core::provider::CostQueryClient`] on top of a SigV4
//! signed JSON client, with credentials resolved up front into an
//! [`ExplorerConfig`].

pub mod client;
pub mod config;
pub mod signer;

#[cfg(test)]
pub mod test_utils;

pub use client::CostExplorerClient;
pub use config::{AwsCredentials, ExplorerConfig};

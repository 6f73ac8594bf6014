//! Client trait for the cost query operation
//!
//! The paginator only needs one remote call. Anything that can answer a
//! single `GetCostAndUsage` page implements this trait: the HTTPS client in
//! `awscost-explorer`, or an in-memory fake in tests.

use crate::error::Result;
use crate::raw::{CostAndUsageRequest, GetCostAndUsageResponse};
use async_trait::async_trait;

/// Trait for cost-and-usage query backends.
#[async_trait]
pub trait CostQueryClient: Send + Sync {
    /// Fetch a single page. Failures map to `AwsCostError::Fetch`.
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> Result<GetCostAndUsageResponse>;
}

#[async_trait]
impl<T: CostQueryClient + ?Sized> CostQueryClient for std::sync::Arc<T> {
    async fn get_cost_and_usage(
        &self,
        request: &CostAndUsageRequest,
    ) -> Result<GetCostAndUsageResponse> {
        (**self).get_cost_and_usage(request).await
    }
}

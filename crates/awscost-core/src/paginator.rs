//! Sequential pagination over `GetCostAndUsage`
//!
//! Each call carries the `NextPageToken` of the previous response, so pages
//! are fetched strictly one after another. The loop stops at the first
//! response without a token. Any failed call aborts the whole fetch and no
//! partial results are returned.
//!
//! # Examples
//!
//! ```no_run
//! use awscost_core::paginator::Paginator;
//! use awscost_core::provider::CostQueryClient;
//! use awscost_core::types::{CostQuery, GroupBy, TimeWindow};
//! use chrono::NaiveDate;
//!
//! # async fn example(client: impl CostQueryClient) -> awscost_core::Result<()> {
//! let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
//! let query = CostQuery::new(TimeWindow::last_days(30, today)?, GroupBy::account_and_service());
//!
//! let table = Paginator::new(client).fetch_table(&query).await?;
//! println!("{} rows", table.len());
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::flatten::Flattener;
use crate::provider::CostQueryClient;
use crate::raw::{CostAndUsageRequest, ResultByTime};
use crate::types::{CostQuery, CostTable};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Fetches every page of a cost query
pub struct Paginator<C> {
    client: C,
    show_progress: bool,
}

impl<C: CostQueryClient> Paginator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            show_progress: false,
        }
    }

    /// Enable or disable the page spinner
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fetch all pages and return their time buckets in API order
    pub async fn fetch_all(&self, query: &CostQuery) -> Result<Vec<ResultByTime>> {
        let (results, _) = self.fetch_pages(query).await?;
        Ok(results)
    }

    /// Fetch all pages and flatten them into a table
    ///
    /// Dimension value descriptions from every page (account names for
    /// `LINKED_ACCOUNT`) become the table's `dimension1` labels.
    pub async fn fetch_table(&self, query: &CostQuery) -> Result<CostTable> {
        let (results, labels) = self.fetch_pages(query).await?;
        let table = Flattener::for_query(query).flatten(&results)?;
        Ok(table.with_dimension1_labels(labels))
    }

    async fn fetch_pages(
        &self,
        query: &CostQuery,
    ) -> Result<(Vec<ResultByTime>, BTreeMap<String, String>)> {
        let first = CostAndUsageRequest::from_query(query);
        let progress = self.spinner();

        let mut results = Vec::new();
        let mut labels = BTreeMap::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let request = first.clone().with_page_token(token.take());
            let response = match self.client.get_cost_and_usage(&request).await {
                Ok(response) => response,
                Err(e) => {
                    if let Some(pb) = &progress {
                        pb.abandon_with_message("Cost query failed");
                    }
                    return Err(e);
                }
            };

            pages += 1;
            debug!(
                "Page {} returned {} time buckets (more: {})",
                pages,
                response.results_by_time.len(),
                response.next_page_token.is_some()
            );
            if let Some(pb) = &progress {
                pb.set_position(pages as u64);
            }

            labels.extend(
                response
                    .dimension_labels()
                    .map(|(value, label)| (value.to_string(), label.to_string())),
            );
            results.extend(response.results_by_time);
            token = response.next_page_token.filter(|t| !t.is_empty());
            if token.is_none() {
                break;
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        info!(
            "Fetched {} time buckets in {} pages for {} ({})",
            results.len(),
            pages,
            query.window,
            query.granularity
        );
        Ok((results, labels))
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}] {pos} pages")
        {
            pb.set_style(style);
        }
        pb.set_message("Querying Cost Explorer");
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Some(pb)
    }
}

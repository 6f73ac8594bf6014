//! Report planning and execution
//!
//! Turns a parsed [`Cli`] into a cost query plus a row filter, runs the
//! query through a [`Paginator`] and renders the result with the selected
//! formatter.
//!
//! Account reports default to a year of monthly buckets and tag reports to
//! thirty days of daily buckets. `--days`, `--since`, `--until` and
//! `--granularity` override those defaults.

use crate::aggregation::{Aggregator, GroupKey, Totals};
use crate::cli::{Cli, Command, parse_date_filter};
use crate::filters::{RowFilter, TagPresence, tag_value};
use crate::output::get_formatter;
use awscost_core::error::{AwsCostError, Result};
use awscost_core::paginator::Paginator;
use awscost_core::provider::CostQueryClient;
use awscost_core::types::{CostQuery, CostTable, Granularity, GroupBy, TimeWindow};
use chrono::{Datelike, Days, NaiveDate};
use tracing::info;

/// Window length for account-based reports
pub const ACCOUNT_REPORT_DAYS: u32 = 365;

/// Window length for tag-based reports and `rows`
pub const TAG_REPORT_DAYS: u32 = 30;

/// What to fetch and which rows to keep for one report
#[derive(Debug, Clone)]
pub struct ReportPlan {
    pub command: Command,
    pub query: CostQuery,
    pub filter: RowFilter,
}

impl ReportPlan {
    /// Build the plan for the CLI's report as of `today`
    pub fn from_cli(cli: &Cli, today: NaiveDate) -> Result<Self> {
        let command = cli.command.clone();
        let (default_days, default_granularity) = match &command {
            Command::Accounts
            | Command::Services
            | Command::Top { .. }
            | Command::AccountServices { .. } => (ACCOUNT_REPORT_DAYS, Granularity::Monthly),
            Command::Rows { .. } | Command::Untagged | Command::Tags => {
                (TAG_REPORT_DAYS, Granularity::Daily)
            }
        };

        let group_by = if command.groups_by_tag() {
            GroupBy::tag_and_service(cli.tag.clone())
        } else {
            GroupBy::account_and_service()
        };

        let window = resolve_window(cli, default_days, today)?;
        let query = CostQuery::new(window, group_by)
            .with_granularity(cli.granularity.unwrap_or(default_granularity))
            .with_metric(cli.metric);

        let month_start = first_of_month(today);
        let filter = match &command {
            Command::Rows { .. } | Command::Accounts | Command::Services => RowFilter::new(),
            Command::Top { .. } => RowFilter::new().with_since(month_start),
            Command::AccountServices {
                accounts,
                min_amount,
            } => {
                let mut filter = RowFilter::new()
                    .with_since(month_start)
                    .with_min_amount(*min_amount);
                if !accounts.is_empty() {
                    filter = filter.with_dimension1(accounts.iter().cloned());
                }
                filter
            }
            Command::Untagged => RowFilter::new()
                .with_since(yesterday(today)?)
                .with_tag_presence(TagPresence::Untagged),
            Command::Tags => RowFilter::new()
                .with_since(month_start)
                .with_tag_presence(TagPresence::Tagged),
        };

        Ok(Self {
            command,
            query,
            filter,
        })
    }

    /// Keep the rows this report wants
    ///
    /// Account filters match either the account ID or the account name from
    /// the table's labels. For tag groupings the `"<key>$"` prefix is
    /// stripped from the kept rows.
    pub fn select_rows(&self, table: CostTable) -> CostTable {
        let CostTable {
            dimension1_name,
            dimension2_name,
            rows,
            dimension1_labels,
        } = table;

        let filter = self.filter.clone().with_dimension1_labels(&dimension1_labels);
        let mut rows = filter.apply(rows);
        if self.command.groups_by_tag() {
            for row in &mut rows {
                row.dimension1 = tag_value(&row.dimension1).to_string();
            }
        }

        CostTable {
            dimension1_name,
            dimension2_name,
            rows,
            dimension1_labels,
        }
    }

    /// Render the selected rows in the requested format
    pub fn render(&self, table: &CostTable, json: bool) -> String {
        let formatter = get_formatter(json);
        let names = (
            table.dimension1_name.as_str(),
            table.dimension2_name.as_str(),
        );
        let rows = &table.rows;

        match &self.command {
            Command::Rows { .. } => formatter.format_rows(table, &Totals::from_rows(rows)),
            Command::Accounts => {
                let data = Aggregator::by_period(rows, GroupKey::Dimension1);
                formatter.format_by_period(names.0, &data, &Totals::from_periods(&data))
            }
            Command::Services => {
                let data = Aggregator::by_period(rows, GroupKey::Dimension2);
                formatter.format_by_period(names.1, &data, &Totals::from_periods(&data))
            }
            Command::Top { limit } => {
                let data = Aggregator::top(rows, GroupKey::Dimension2, *limit);
                formatter.format_top(names.1, &data, &Totals::from_keys(&data))
            }
            Command::AccountServices { .. } | Command::Tags => {
                let data = Aggregator::by_pair(rows);
                formatter.format_by_pair(names, &data, &Totals::from_pairs(&data))
            }
            Command::Untagged => {
                let mut data = Aggregator::by_period(rows, GroupKey::Dimension2);
                Aggregator::sort_by_amount_desc(&mut data);
                formatter.format_by_period(names.1, &data, &Totals::from_periods(&data))
            }
        }
    }
}

/// Run the CLI's report against `paginator` and return the rendered output
pub async fn run_report<C: CostQueryClient>(
    paginator: &Paginator<C>,
    cli: &Cli,
    today: NaiveDate,
) -> Result<String> {
    let plan = ReportPlan::from_cli(cli, today)?;
    info!(
        "Querying {} {} costs for {} grouped by {} and {}",
        plan.query.granularity,
        plan.query.metric,
        plan.query.window,
        plan.query.group_by.dimension1_name(),
        plan.query.group_by.dimension2_name()
    );

    let table = paginator.fetch_table(&plan.query).await?;
    let fetched = table.len();
    let table = plan.select_rows(table);
    info!("Kept {} of {} rows", table.len(), fetched);

    Ok(plan.render(&table, cli.json))
}

/// Query window from `--since`/`--until`/`--days`
///
/// `--until` is inclusive, so the exclusive window end is the day after it.
fn resolve_window(cli: &Cli, default_days: u32, today: NaiveDate) -> Result<TimeWindow> {
    let end = match &cli.until {
        Some(until) => parse_date_filter(until)?
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AwsCostError::InvalidDate(format!("Date out of range: {until}")))?,
        None => today,
    };

    match &cli.since {
        Some(since) => TimeWindow::new(parse_date_filter(since)?, end),
        None => TimeWindow::last_days(cli.days.unwrap_or(default_days), end),
    }
}

fn first_of_month(today: NaiveDate) -> NaiveDate {
    today.with_day(1).unwrap_or(today)
}

fn yesterday(today: NaiveDate) -> Result<NaiveDate> {
    today
        .pred_opt()
        .ok_or_else(|| AwsCostError::InvalidDate(format!("No day before {today}")))
}

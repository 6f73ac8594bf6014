//! awscost - Summarize AWS Cost Explorer data by account, service and tag

use awscost::{cli::Cli, error::Result, report::run_report};
use awscost_core::paginator::Paginator;
use awscost_explorer::{CostExplorerClient, ExplorerConfig};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Quiet by default; --verbose raises our crates to info. RUST_LOG wins when set.
    let default_filter = if cli.verbose {
        "awscost=info,awscost_core=info,awscost_explorer=info"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ExplorerConfig::resolve(
        cli.profile.as_deref(),
        Some(cli.region.as_str()),
        cli.endpoint.as_deref(),
    )?;
    info!("Using Cost Explorer endpoint {}", config.endpoint_url());

    // Spinner only for terminal output
    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let paginator = Paginator::new(CostExplorerClient::new(config)?).with_progress(show_progress);

    let today = Utc::now().date_naive();
    let output = run_report(&paginator, &cli, today).await?;
    println!("{output}");

    Ok(())
}

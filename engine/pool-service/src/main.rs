use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use pool_service::{load_configuration, logging, PoolService};

#[derive(Parser)]
#[command(name = "pool-service", version, about = "Hockey pool standings and stats sync")]
struct Cli {
    /// TOML configuration file (defaults to $POOL_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recompute standings for live pools and announce fresh stats
    Sync {
        #[arg(long)]
        pool: Option<i64>,
    },
    /// Print a pool's standings as seen by one participant
    Standings {
        #[arg(long)]
        pool: i64,
        #[arg(long)]
        viewer: i64,
    },
    /// Print this week's scoring leaders
    TopScorers {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Search players and show their availability in a pool
    Search {
        #[arg(long)]
        pool: i64,
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print the effective configuration as TOML
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path =
        cli.config.or_else(|| std::env::var_os("POOL_CONFIG").map(PathBuf::from));

    let config = load_configuration(config_path.as_deref())?;
    logging::initialize_logging(&config.logging)?;

    info!("Starting Pool Service v{}", env!("CARGO_PKG_VERSION"));

    if let Command::ShowConfig = cli.command {
        let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    let service = PoolService::new(config).await?;
    let aggregator = &service.aggregator;

    match cli.command {
        Command::Sync { pool } => {
            let report = aggregator.sync_pools(pool).await?;
            print_json(&report)?;
            let metrics = aggregator.stats().metrics();
            info!(
                "Cache after sync: {} upstream calls, {} failures, hit rate {:.2}",
                metrics.upstream_calls,
                metrics.upstream_failures,
                metrics.hit_rate()
            );
            if !report.pools_failed.is_empty() {
                anyhow::bail!("{} pool(s) failed to sync", report.pools_failed.len());
            }
        }
        Command::Standings { pool, viewer } => {
            let standings = aggregator.get_standings(pool, viewer).await?;
            print_json(&standings)?;
        }
        Command::TopScorers { limit } => {
            let limit = limit.unwrap_or(service.config.service.top_scorers_limit);
            let leaders = aggregator.top_scorers(limit).await;
            print_json(&leaders)?;
        }
        Command::Search { pool, query, limit } => {
            let limit = limit.unwrap_or(service.config.service.search_limit);
            let results = aggregator.search_players(pool, &query, limit).await?;
            print_json(&results)?;
        }
        Command::ShowConfig => {}
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use channel_harvester::{
    config::Config,
    pipeline::{Pipeline, RunStatus},
};

#[derive(Parser)]
#[command(name = "channel-harvester")]
#[command(version = "0.1.0")]
#[command(about = "Scrapes live TV channel feeds into per-country M3U8 playlists and tracks changes")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("channel_harvester={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Channel Harvester v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    if let Some(output_dir) = cli.output_dir {
        config.output.dir = output_dir;
    }
    info!("Writing output to: {}", config.output.dir.display());

    let pipeline = Pipeline::from_config(&config)?;
    let summary = pipeline.run_once(Utc::now()).await?;

    info!(
        "Done: {} channels in {} groups, {} playlists written",
        summary.total_channels,
        summary.total_groups,
        summary.playlists.len()
    );
    if summary.status == RunStatus::Degraded {
        for outcome in summary.feeds.iter().filter(|o| o.is_degraded()) {
            tracing::warn!(
                "Feed {} failed: {}",
                outcome.feed,
                outcome.error.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(())
}

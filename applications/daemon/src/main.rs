/// Coda daemon - keeps the music catalog in sync with the filesystem
use clap::{Parser, Subcommand};
use coda_scanner::{ScanOptions, ScanSummary, Scanner};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::DaemonConfig;

#[derive(Parser)]
#[command(name = "codad")]
#[command(about = "Coda library synchronization daemon", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./coda.toml)
    #[arg(short, long, env = "CODA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scan-and-clean pass and exit
    Scan {
        /// Bypass change detection and re-process every file
        #[arg(long)]
        full: bool,
    },
    /// Run the scheduler: scan at start, interval scans, and the
    /// filesystem watcher, as configured
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codad=info,coda_scanner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = DaemonConfig::load(cli.config.as_ref())?;

    let pool = coda_storage::create_pool(&config.database_url).await?;
    coda_storage::run_migrations(&pool).await?;

    let scanner = Scanner::with_lofty(pool, &config.library)?;

    match cli.command {
        Commands::Scan { full } => scan_once(&scanner, full).await,
        Commands::Run => run(scanner, &config).await,
    }
}

async fn scan_once(scanner: &Scanner, full: bool) -> anyhow::Result<()> {
    let summary = scanner.scan_and_clean(ScanOptions { full }).await?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ScanSummary) {
    println!(
        "tracks seen: {}, newly added: {}",
        summary.seen_tracks, summary.new_tracks
    );
    println!(
        "removed: {} tracks, {} folders, {} albums, {} artists, {} genres",
        summary.removed.tracks,
        summary.removed.folders,
        summary.removed.albums,
        summary.removed.artists,
        summary.removed.genres
    );
    if !summary.errors.is_empty() {
        eprintln!("completed with errors: {}", summary.errors);
    }
}

async fn run(scanner: Scanner, config: &DaemonConfig) -> anyhow::Result<()> {
    let scanner = Arc::new(scanner);
    let cancel = CancellationToken::new();
    let mut tasks = tokio::task::JoinSet::new();

    if config.library.scan_at_start {
        match scanner.scan_and_clean(ScanOptions::default()).await {
            Ok(summary) => print_summary(&summary),
            // Startup scan failures never take the daemon down
            Err(error) => tracing::error!(%error, "startup scan failed"),
        }
    }

    if config.library.scan_interval_minutes > 0 {
        let scanner = scanner.clone();
        let cancel = cancel.clone();
        let every = Duration::from_secs(config.library.scan_interval_minutes * 60);
        tasks.spawn(async move {
            scanner.run_periodic(every, cancel).await;
        });
    }

    if config.library.scan_watcher {
        let scanner = scanner.clone();
        let cancel = cancel.clone();
        tasks.spawn(async move {
            if let Err(error) = scanner.execute_watch(cancel).await {
                tracing::error!(%error, "watcher failed");
            }
        });
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    cancel.cancel();
    while tasks.join_next().await.is_some() {}

    Ok(())
}

//! urlstats main entry point
//!
//! Starts the tracker and serves its HTTP API until Ctrl-C.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use urlstats::config::{load_config_with_hash, Config};
use urlstats::{api, Tracker};

/// urlstats: tracks submitted URLs and their download statistics
///
/// Every new URL is downloaded once to measure its size and latency. The
/// most submitted URLs are re-checked periodically.
#[derive(Parser, Debug)]
#[command(name = "urlstats")]
#[command(version)]
#[command(about = "URL download statistics tracker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; built-in defaults are used without one
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the HTTP port from the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(port) = cli.port {
        config.server.http_port = port;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    run(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("urlstats=info,warn"),
            1 => EnvFilter::new("urlstats=debug,info"),
            2 => EnvFilter::new("urlstats=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn handle_dry_run(config: &Config) {
    println!("=== urlstats Dry Run ===\n");

    println!("Engine:");
    println!(
        "  Max parallel downloads: {}",
        config.engine.max_parallel_downloads
    );
    println!("  Queue size: {}", config.engine.queue_size);
    println!("  Request timeout: {}ms", config.engine.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.engine.connect_timeout_ms);

    println!("\nRe-check:");
    println!("  Interval: {}s", config.recheck.interval_secs);
    println!("  Top URLs: {}", config.recheck.top_n);

    println!("\nServer:");
    println!(
        "  Address: {}:{}",
        config.server.bind_address, config.server.http_port
    );
    println!(
        "  Max URLs in search results: {}",
        config.server.max_urls_in_search_results
    );
    println!(
        "  Request timeout: {}s",
        config.server.request_timeout_secs
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

async fn run(config: Config) -> anyhow::Result<()> {
    let runtime = Tracker::start(&config).context("failed to start tracker")?;

    let served = api::serve(runtime.tracker(), &config.server, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
        tracing::info!("Shutdown requested");
    })
    .await;

    runtime.shutdown().await;

    served.context("HTTP server failed")
}

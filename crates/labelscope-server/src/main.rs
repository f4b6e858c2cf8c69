//! Labelscope server
//!
//! Serves cross-entity label queries over entities loaded into in-memory
//! stores:
//! - `GET /api/labels/{type}?label=&page=&page_size=` with `type` one of
//!   `route`, `service`, `upstream`, `ssl`, `consumer` or `all`
//! - `GET /healthz`
//!
//! Usage:
//! ```bash
//! # With config file
//! labelscope-server --config config.yaml
//!
//! # Env vars override the config file, CLI flags override both
//! LABELSCOPE_SEED_FILE=seed.yaml labelscope-server --port 9180
//!
//! # Validate a seed file without starting the server
//! labelscope-server check-seed --seed seed.yaml
//! ```
//!
//! Test with:
//! ```bash
//! curl 'http://localhost:9080/api/labels/route?label=env:production'
//! curl 'http://localhost:9080/api/labels/all?label=&page=1&page_size=10'
//! ```

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::ServerConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use labelscope_api::{AppState, router};
use labelscope_core::StoreHub;
use labelscope_labels::LabelQuery;
use labelscope_store_memory::{SeedFile, empty_hub};

/// Labelscope Server - label queries across gateway entities
#[derive(Parser)]
#[command(name = "labelscope-server")]
#[command(about = "Cross-entity label query server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "LABELSCOPE_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Address to bind
    #[arg(long, value_name = "HOST", global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Parse a seed file and print how many entities of each kind it holds
    CheckSeed {
        /// Seed file to check (defaults to `stores.seed_file` from config)
        #[arg(long, value_name = "FILE")]
        seed: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ServerConfig::default(),
    };

    // Env vars override the file, CLI flags override both
    config.merge_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    init_tracing(&config.logging.level)?;
    match &cli.config {
        Some(path) => info!("📁 Loaded configuration from: {}", path),
        None => info!("📁 Using default configuration"),
    }

    match cli.command {
        Some(Commands::CheckSeed { seed }) => {
            let path = seed
                .or_else(|| config.stores.seed_file.as_ref().map(PathBuf::from))
                .context("No seed file given (use --seed or stores.seed_file)")?;
            check_seed(&path)
        }
        Some(Commands::Serve) | None => serve(config).await,
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log level '{}' ({}), using info", level, e);
        EnvFilter::new("info")
    });

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn check_seed(path: &Path) -> anyhow::Result<()> {
    let seed = SeedFile::from_file(path)
        .with_context(|| format!("Failed to load seed file {:?}", path))?;

    println!("{}", path.display());
    for (kind, count) in seed.counts() {
        println!("  {:<10} {}", kind.as_str(), count);
    }
    println!("  {:<10} {}", "total", seed.len());

    // Catches entities a store would reject
    seed.into_hub()?;
    Ok(())
}

fn build_hub(config: &ServerConfig) -> anyhow::Result<StoreHub> {
    match &config.stores.seed_file {
        Some(path) => {
            info!("🌱 Seeding stores from: {}", path);
            let seed = SeedFile::from_file(path)
                .with_context(|| format!("Failed to load seed file {}", path))?;
            for (kind, count) in seed.counts() {
                info!("   - {}: {} entities", kind, count);
            }
            Ok(seed.into_hub()?)
        }
        None => {
            warn!("No seed file configured, starting with empty stores");
            Ok(empty_hub())
        }
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let hub = build_hub(&config)?;
    let state = AppState::new(LabelQuery::new(hub));

    let mut app = router(state);
    if config.logging.log_requests {
        app = app.layer(TraceLayer::new_for_http());
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    info!("");
    info!("✅ Labelscope listening on http://{}", addr);
    info!("   - Labels:       http://{}/api/labels/{{type}}?label=", addr);
    info!("   - Health check: http://{}/healthz", addr);
    info!("");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

//! camfeedd: camfeed daemon.
//!
//! Serves the merged model directory as a JSON API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use camfeed::server::config::{Config, Secrets, build_aggregator};
use camfeed::server::{AppState, create_router};
use camfeed::{FeedError, HttpTranslator, TranslationQueue};

/// camfeed daemon, multi-provider model directory API.
#[derive(Parser)]
#[command(name = "camfeedd")]
#[command(version)]
#[command(about = "camfeed aggregation daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "CAMFEED_CONFIG")]
    config: Option<PathBuf>,

    /// Secrets file; overrides the standard locations.
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Override the bind address from the config file.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let secrets = match args.secrets.as_deref() {
        Some(path) => Secrets::load_from_file(path)?,
        None => Secrets::load()?,
    };

    let aggregator = build_aggregator(&config, &secrets)?;
    let mut state = AppState::new(Arc::new(aggregator))
        .with_default_provider(config.aggregator.default_selection()?)
        .with_limits(config.server.limits.clone());

    if let Some(ref translation) = config.translation {
        let mut translator = HttpTranslator::new(
            &translation.base_url,
            Duration::from_secs(translation.timeout_secs),
        )?;
        if let Some(key) = secrets.translation_key() {
            translator = translator.api_key(key);
        }
        state = state.with_translator(TranslationQueue::new(Arc::new(translator)));
    }

    // Parse address
    let address = args.address.unwrap_or(config.server.address.clone());
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| FeedError::Configuration(format!("Invalid address '{address}': {e}")))?;

    let app = create_router(state, &config.server.cors_origins);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(version = env!("CARGO_PKG_VERSION"), %addr, "camfeedd starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("camfeedd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until killed.
        std::future::pending::<()>().await;
    }
}

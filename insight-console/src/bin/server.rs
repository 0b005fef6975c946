//! Insight Console web server

use anyhow::{Context, Result};
use clap::Parser;
use insight::web::create_router;
use insight::{ClientConfig, InsightApp};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "insight-server", version, about = "Serve the Insight Console in a browser")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend API base URL (overrides the config file)
    #[arg(long)]
    api_url: Option<String>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }

    info!("Starting Insight Console v{}", env!("CARGO_PKG_VERSION"));
    info!(
        api = %config.api_base_url,
        poll_interval_secs = config.poll_interval_secs,
        "Loaded configuration"
    );

    let app = Arc::new(InsightApp::from_config(&config).context("Failed to create backend client")?);

    // Start status polling
    let _poller = app.monitor().start(config.poll_interval());

    let router = create_router(Arc::clone(&app));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, router).await?;

    Ok(())
}

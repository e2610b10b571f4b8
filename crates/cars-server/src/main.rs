use anyhow::Result;
use cars::services::ConfigService;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod state;

/// Cars record service
#[derive(Parser)]
#[command(name = "cars-server", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "CARS_CONFIG_FILE", default_value = "cars.toml")]
    config: PathBuf,

    /// Address to listen on, overrides `server.bind`
    #[arg(long, env = "CARS_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = ConfigService::new(&args.config).load()?;
    let addr = args.bind.unwrap_or_else(|| config.server.bind.clone());

    let state = state::AppState::from_config(config).await?;
    let app = api::build_router(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        },
    }
}

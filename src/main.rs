use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use llm_gateway::config::{Cli, Config};
use llm_gateway::server::gateway_api::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading anything else.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "llm_gateway=debug,tower_http=debug"
    } else {
        "llm_gateway=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("llm-gateway v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!(
        upstream = %config.base_url,
        chat_model = %config.chat_model,
        embeddings_model = %config.embeddings_model,
        api_key_configured = config.api_key.is_some(),
        cors_origins = config.cors_origins.len(),
        "Configuration loaded"
    );

    let port = config.port;
    let state = Arc::new(AppState::new(Arc::new(config)));
    let app = build_router(state);

    let listen_addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

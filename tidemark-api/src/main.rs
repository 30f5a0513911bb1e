use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tidemark_api::config::ApiConfig;
use tidemark_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ApiConfig::from_env().context("loading configuration")?;
    let state = AppState::new(&config).context("building application state")?;
    let app = tidemark_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Tidemark API listening");

    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}

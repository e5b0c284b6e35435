use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use vta_backend::core::{config::AppConfig, logging};
use vta_backend::server::router;
use vta_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("{}", e))?;
    logging::init(&config.log_dir);

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(8000);
    let bind_addr = format!("0.0.0.0:{}", port);

    let state = AppState::initialize(config)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use folio::logging::init_tracing;
use folio::router::init_router;
use folio::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?;
    let bind_addr = state.app_config.bind_addr.clone();
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(addr = %bind_addr, "Server running");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

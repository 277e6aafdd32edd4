use std::sync::Arc;

use anyhow::Context;
use itemproc_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    itemproc_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = itemproc_api::app::services::AppServices::from_config(&config)
        .await
        .context("failed to initialise item store")?;

    let app = itemproc_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

use anyhow::Context;
use market_dashboard::app;
use market_dashboard::utils::{config::AppConfig, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    logging::init_logging();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let addr = config.server.addr;
    let app = app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Axum listening on http://{}", listener.local_addr()?);
    for rule in &config.upstreams.rewrites {
        tracing::info!("Forwarding {} -> {}", rule.prefix, rule.destination);
    }

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

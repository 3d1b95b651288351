//! shopmetrics gateway binary.
//!
//! Loads `shopmetrics.yaml` (or `$SHOPMETRICS_CONFIG`), builds the standard
//! registry and serves the product/user routes plus `/health`, `/ready` and
//! the metrics route. Ctrl-C flips readiness to draining, then shuts down.

use tracing_subscriber::{fmt, EnvFilter};

use shopmetrics_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = config::path_from_env();
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.gateway.listen_addr()?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "shopmetrics-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            state.set_draining(true);
            tracing::info!("shutdown requested, draining");
        })
        .await?;

    Ok(())
}

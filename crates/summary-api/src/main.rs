//! # cart-summary
//!
//! Serves itemized cart summaries over HTTP.
//!
//! ```bash
//! SUMMARY_CONFIG=config/summary.toml PORT=8080 cart-summary
//! ```
//!
//! Logs are human-readable by default and JSON when `ENVIRONMENT=production`;
//! `RUST_LOG` overrides the INFO default.

use summary_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if config.is_production() {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(false))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().compact())
            .with(filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining requests");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config);

    let addr = config.socket_addr()?;
    let state = AppState::from_config(config)?;
    let definition = &state.definition;

    info!(
        environment = %state.config.environment,
        summary = definition.name(),
        extras = ?definition.registry().keys(),
        decimal_places = definition.policy().decimal_places,
        prevent_negative = definition.policy().prevent_negative,
        "Summary definition loaded"
    );

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "cart-summary listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("cart-summary stopped");
    Ok(())
}

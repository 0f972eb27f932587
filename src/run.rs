//! Server startup.

use axum::Router;
use axum::http::Method;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors;

use crate::config::Config;
use crate::handlers;
use crate::state::CheckoutState;
use crate::util::{SigDown, Telemetry};

/// Initializes the Pix checkout server.
///
/// - Loads `.env` variables.
/// - Initializes logging and OpenTelemetry tracing.
/// - Loads the merchant configuration.
/// - Starts an Axum HTTP server with the `/pix` handlers.
///
/// Binds to the address from the config file, or the `HOST` and `PORT` env vars.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env variables
    dotenv().ok();

    let telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let config = Config::load()?;
    if !config.pix().is_configured() {
        tracing::warn!("No Pix key configured; checkouts are unavailable until one is set");
    }

    let axum_state = Arc::new(CheckoutState::from_config(&config));
    if !axum_state.admin_token().is_enabled() {
        tracing::warn!("No admin token configured; PUT /pix/config is disabled");
    }

    let http_endpoints = Router::new()
        .merge(handlers::routes().with_state(axum_state))
        .layer(telemetry.http_tracing())
        .layer(
            cors::CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        );

    let addr = SocketAddr::new(config.host(), config.port());
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e))?;

    let sig_down = SigDown::try_new()?;
    let axum_cancellation_token = sig_down.cancellation_token();
    let axum_graceful_shutdown = async move { axum_cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(axum_graceful_shutdown)
        .await?;

    Ok(())
}

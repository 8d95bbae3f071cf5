//! This project is split in 2 main modules:
//!
//! - [stripe] (payment backend client)
//! - [checkout] (checkout orchestration and API surface)
#![doc = include_str!("../README.md")]

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

use axum::Router;
use tracing_subscriber::EnvFilter;

use crate::checkout::presentation::{HeadlessSheet, PresentationDelegate};

/// Checkout orchestration
///
/// This module defines the checkout state machine, the presentation-delegate
/// seam and the HTTP API surface.
mod checkout;
mod config;
mod state;
/// Payment backend integration
///
/// This module defines the types and methods to communicate with the payment
/// vendor's REST API.
mod stripe;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .init();

    match dotenvy::dotenv() {
        Ok(p) => tracing::info!(path = %p.display(), "Loaded environment variables from .env file"),
        Err(e) => tracing::warn!("Failed to load environment variables from .env: {e}"),
    };
    let config = Arc::new(config::CheckoutConfig::from_env()?);
    let gate = stripe::StripeGateway::new(&config);
    let delegate: Arc<dyn PresentationDelegate> =
        Arc::new(HeadlessSheet::new(gate.clone(), &config));

    let links = checkout::deeplink::DeepLinkRouter::default();
    // Held until shutdown so incoming URL events reach the sheet; dropping
    // it deregisters the handler.
    let _url_registration = links.register(delegate.clone());

    let orchestrator = Arc::new(checkout::orchestrator::Orchestrator::new(
        gate,
        delegate,
        config.clone(),
    ));
    let state = state::AppState::new(orchestrator, links, config);

    let app = Router::new()
        .nest("/checkout", checkout::api::router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3030);

    let listener = tokio::net::TcpListener::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))
        .await
        .expect("port is available");

    tracing::info!("Serving on port {port}");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("server runs until shutdown");
    Ok(())
}

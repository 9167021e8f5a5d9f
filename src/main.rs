//! Castfinder backend entry point
//!
//! Serves `/api/search` and `/api/movie-cast` over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use castfinder::app::{AppState, build_app};
use castfinder::config::Config;
use castfinder::services::{TmdbClient, TmdbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "castfinder=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Castfinder");

    // Refuse to serve without TMDB credentials and URLs
    let config = Config::from_env().context("Invalid configuration")?;
    tracing::info!(
        cast_cache = config.cast_cache_enabled,
        rate_limit = config.rate_limit_max_requests,
        "Configuration loaded"
    );

    let tmdb = TmdbClient::new(TmdbConfig {
        api_key: config.tmdb_api_key.clone(),
        base_url: config.tmdb_api_base_url.clone(),
        language: config.tmdb_language.clone(),
        requests_per_second: config.tmdb_requests_per_second,
    })
    .context("Failed to create TMDB client")?;

    let state = AppState::from_config(&config, Arc::new(tmdb));
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        "Listening on {} ({})",
        addr,
        config.host.as_deref().unwrap_or("localhost")
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

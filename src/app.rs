//! Application state and HTTP router construction.
//!
//! Used by [main] and by the API tests to build the Axum app.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::Config;
use crate::services::{
    AdmissionConfig, LookupOptions, LookupService, LookupStores, MetadataSource, ResultCache,
    SlidingWindowLimiter,
};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<LookupService>,
}

impl AppState {
    /// Build the lookup service and its stores from configuration.
    pub fn from_config(config: &Config, source: Arc<dyn MetadataSource>) -> Self {
        let stores = LookupStores {
            limiter: Arc::new(SlidingWindowLimiter::new(AdmissionConfig {
                window: config.rate_limit_window,
                max_requests: config.rate_limit_max_requests,
            })),
            search_cache: Arc::new(ResultCache::new(config.search_cache_ttl)),
            cast_cache: config
                .cast_cache_enabled
                .then(|| Arc::new(ResultCache::new(config.search_cache_ttl))),
        };

        let options = LookupOptions {
            image_base_url: config.tmdb_image_base_url.clone(),
            credits_language: config.tmdb_language.clone(),
        };

        Self {
            lookup: Arc::new(LookupService::new(source, stores, options)),
        }
    }
}

/// Build the full Axum router: health checks, /api, and tracing.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .nest("/api", api::lookup::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

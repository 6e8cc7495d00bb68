//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use catalog_scrapers::{HttpFetcher, RunnerOptions};

use crate::config::Config;
use crate::server::routes::{
    add_binder_card_handler, binder_handler, collection_cards_handler, collection_handler,
    collections_handler, create_search_handler, delete_search_handler, health_handler,
    remove_binder_card_handler, scrape_handler, searches_handler, update_binder_card_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub fetcher: Arc<HttpFetcher>,
    pub runner_options: RunnerOptions,
}

/// Build the Axum application router
pub fn build_app(pool: PgPool, config: &Config) -> Result<Router> {
    let fetcher = Arc::new(HttpFetcher::new().context("Failed to create page fetcher")?);

    let app_state = AppState {
        db_pool: pool,
        fetcher,
        runner_options: RunnerOptions {
            detail_concurrency: config.scrape_concurrency,
            max_pages: config.scrape_max_pages,
            request_delay: Duration::from_millis(config.scrape_request_delay_ms),
        },
    };

    // CORS: configured origins in production, anything in development
    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    };

    let app = Router::new()
        .route("/health", get(health_handler))
        // Catalog browsing
        .route("/api/collections", get(collections_handler))
        .route("/api/collections/:id", get(collection_handler))
        .route("/api/collections/:id/cards", get(collection_cards_handler))
        // Scraping (NDJSON progress stream)
        .route("/api/scrape/:franchise/:set_code", post(scrape_handler))
        // Binder (user-owned copies)
        .route(
            "/api/users/:user_id/binder",
            get(binder_handler).post(add_binder_card_handler),
        )
        .route(
            "/api/users/:user_id/binder/:id",
            patch(update_binder_card_handler).delete(remove_binder_card_handler),
        )
        // Saved searches
        .route(
            "/api/users/:user_id/searches",
            get(searches_handler).post(create_search_handler),
        )
        .route(
            "/api/users/:user_id/searches/:id",
            axum::routing::delete(delete_search_handler),
        )
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

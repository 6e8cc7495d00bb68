//! Scrape endpoint.
//!
//! POST /api/scrape/{franchise}/{set_code}
//!
//! Responds immediately with a chunked `application/x-ndjson` body and
//! streams progress events while the scrape runs. One JSON object per
//! line; the last line is always `done` or `error`. Closing the
//! connection cancels the run.

use axum::body::Body;
use axum::extract::{Extension, Path};
use axum::http::header;
use axum::response::Response;

use crate::common::Franchise;
use crate::domains::scraping;
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    Path((franchise, set_code)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let franchise: Franchise = franchise
        .parse()
        .map_err(|e: crate::common::UnknownFranchise| ApiError::BadRequest(e.to_string()))?;

    if set_code.trim().is_empty() {
        return Err(ApiError::BadRequest("set code must not be empty".to_string()));
    }

    tracing::info!(
        franchise = %franchise,
        set_code = %set_code,
        "Starting scrape"
    );

    let rx = scraping::spawn_scrape(
        state.db_pool.clone(),
        state.fetcher.clone(),
        state.runner_options.clone(),
        franchise,
        set_code,
    );

    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(scraping::ndjson_stream(rx)))
        .map_err(|e| ApiError::Internal(e.into()))
}

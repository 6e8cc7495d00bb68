use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;

use crate::common::{SavedSearchId, UserId};
use crate::domains::searches::{self, NewSavedSearch, SavedSearch};
use crate::server::app::AppState;
use crate::server::error::ApiError;

pub async fn searches_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<SavedSearch>>, ApiError> {
    let searches = searches::data::list_for_user(&state.db_pool, user_id).await?;
    Ok(Json(searches))
}

pub async fn create_search_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<NewSavedSearch>,
) -> Result<(StatusCode, Json<SavedSearch>), ApiError> {
    if payload.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let search = searches::data::create(&state.db_pool, user_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(search)))
}

pub async fn delete_search_handler(
    Extension(state): Extension<AppState>,
    Path((user_id, id)): Path<(UserId, SavedSearchId)>,
) -> Result<StatusCode, ApiError> {
    let deleted = searches::data::delete(&state.db_pool, user_id, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No saved search with id {}", id)))
    }
}

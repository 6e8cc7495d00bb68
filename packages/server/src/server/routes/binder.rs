use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::common::{CollectedCardId, UserId};
use crate::domains::binder::{self, BinderEntry, CollectedCard, NewCollectedCard};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// List the user's binder.
pub async fn binder_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<BinderEntry>>, ApiError> {
    let entries = binder::data::list_for_user(&state.db_pool, user_id).await?;
    Ok(Json(entries))
}

/// Add copies of a card to the binder.
pub async fn add_binder_card_handler(
    Extension(state): Extension<AppState>,
    Path(user_id): Path<UserId>,
    Json(payload): Json<NewCollectedCard>,
) -> Result<(StatusCode, Json<CollectedCard>), ApiError> {
    if payload.quantity <= 0 {
        return Err(ApiError::BadRequest(
            "quantity must be positive".to_string(),
        ));
    }

    let collected = binder::data::add_card(&state.db_pool, user_id, &payload)
        .await
        .map_err(|e| match e.downcast_ref::<sqlx::Error>() {
            // FK violation: the card doesn't exist in the catalog
            Some(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                ApiError::BadRequest(format!("Unknown card id {}", payload.card_id))
            }
            _ => ApiError::Internal(e),
        })?;

    Ok((StatusCode::CREATED, Json(collected)))
}

#[derive(Deserialize)]
pub struct UpdateQuantity {
    pub quantity: i32,
}

/// Set the quantity of a binder row; zero removes it.
pub async fn update_binder_card_handler(
    Extension(state): Extension<AppState>,
    Path((user_id, id)): Path<(UserId, CollectedCardId)>,
    Json(payload): Json<UpdateQuantity>,
) -> Result<Json<Option<CollectedCard>>, ApiError> {
    let updated =
        binder::data::set_quantity(&state.db_pool, user_id, id, payload.quantity).await?;
    resolve_quantity_update(payload.quantity, updated, id).map(Json)
}

/// A positive-quantity update that matched no row is a 404; `None` from a
/// zero-quantity removal is the normal "row gone" response.
fn resolve_quantity_update(
    quantity: i32,
    updated: Option<CollectedCard>,
    id: CollectedCardId,
) -> Result<Option<CollectedCard>, ApiError> {
    if quantity > 0 && updated.is_none() {
        return Err(ApiError::NotFound(format!("No binder entry with id {}", id)));
    }
    Ok(updated)
}

/// Remove a binder row.
pub async fn remove_binder_card_handler(
    Extension(state): Extension<AppState>,
    Path((user_id, id)): Path<(UserId, CollectedCardId)>,
) -> Result<StatusCode, ApiError> {
    let removed = binder::data::remove(&state.db_pool, user_id, id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No binder entry with id {}", id)))
    }
}

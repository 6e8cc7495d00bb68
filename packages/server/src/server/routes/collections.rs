use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{CollectionId, Franchise};
use crate::domains::catalog::{self, Card, Collection};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Deserialize)]
pub struct CollectionsQuery {
    franchise: Option<String>,
}

/// List collections, optionally filtered by franchise.
pub async fn collections_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<CollectionsQuery>,
) -> Result<Json<Vec<Collection>>, ApiError> {
    let franchise = query
        .franchise
        .map(|raw| raw.parse::<Franchise>())
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let collections = catalog::data::list_collections(&state.db_pool, franchise).await?;
    Ok(Json(collections))
}

#[derive(Serialize)]
pub struct CollectionWithCards {
    #[serde(flatten)]
    pub collection: Collection,
    pub cards: Vec<Card>,
}

/// A collection with all of its cards.
pub async fn collection_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CollectionId>,
) -> Result<Json<CollectionWithCards>, ApiError> {
    let collection = catalog::data::get_collection(&state.db_pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No collection with id {}", id)))?;
    let cards = catalog::data::list_cards(&state.db_pool, id).await?;

    Ok(Json(CollectionWithCards { collection, cards }))
}

/// Just the cards of a collection.
pub async fn collection_cards_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<CollectionId>,
) -> Result<Json<Vec<Card>>, ApiError> {
    if catalog::data::get_collection(&state.db_pool, id).await?.is_none() {
        return Err(ApiError::NotFound(format!("No collection with id {}", id)));
    }
    let cards = catalog::data::list_cards(&state.db_pool, id).await?;
    Ok(Json(cards))
}

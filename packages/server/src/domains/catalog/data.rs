//! Catalog queries. Writes happen through the scraper's store; the API
//! surface is read-only.

use anyhow::{Context, Result};
use sqlx::PgPool;

use super::models::{Card, Collection};
use crate::common::{CollectionId, Franchise};

pub async fn list_collections(
    pool: &PgPool,
    franchise: Option<Franchise>,
) -> Result<Vec<Collection>> {
    let collections = match franchise {
        Some(franchise) => {
            sqlx::query_as::<_, Collection>(
                r#"
                SELECT id, franchise, code, name, source_url, release_date, card_count, scraped_at
                FROM collections
                WHERE franchise = $1
                ORDER BY name
                "#,
            )
            .bind(franchise.as_str())
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Collection>(
                r#"
                SELECT id, franchise, code, name, source_url, release_date, card_count, scraped_at
                FROM collections
                ORDER BY franchise, name
                "#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list collections")?;

    Ok(collections)
}

pub async fn get_collection(pool: &PgPool, id: CollectionId) -> Result<Option<Collection>> {
    sqlx::query_as::<_, Collection>(
        r#"
        SELECT id, franchise, code, name, source_url, release_date, card_count, scraped_at
        FROM collections
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get collection")
}

pub async fn list_cards(pool: &PgPool, collection_id: CollectionId) -> Result<Vec<Card>> {
    sqlx::query_as::<_, Card>(
        r#"
        SELECT id, collection_id, name, number, rarity, image_url, detail_url,
               extra, content_hash, scraped_at
        FROM cards
        WHERE collection_id = $1
        ORDER BY number
        "#,
    )
    .bind(collection_id)
    .fetch_all(pool)
    .await
    .context("Failed to list cards")
}

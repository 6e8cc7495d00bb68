//! Persistence seam for scrape runs.
//!
//! The runner only sees the [`CatalogStore`] trait so tests can run against
//! an in-memory mock. [`PgCatalogStore`] is the production implementation
//! over the server's Postgres schema.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::sites::Franchise;
use crate::types::{ContentHash, ScrapedCard, ScrapedCollection};

/// The persisted view of a card the dedup check needs.
#[derive(Debug, Clone)]
pub struct StoredCard {
    pub id: Uuid,
    pub content_hash: String,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert or refresh a collection row; returns its id.
    async fn upsert_collection(
        &self,
        franchise: Franchise,
        collection: &ScrapedCollection,
    ) -> Result<Uuid>;

    /// Look up a card by its position in the collection.
    async fn find_card(&self, collection_id: Uuid, number: &str) -> Result<Option<StoredCard>>;

    async fn insert_card(
        &self,
        collection_id: Uuid,
        card: &ScrapedCard,
        hash: &ContentHash,
    ) -> Result<Uuid>;

    async fn update_card(&self, id: Uuid, card: &ScrapedCard, hash: &ContentHash) -> Result<()>;
}

pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn upsert_collection(
        &self,
        franchise: Franchise,
        collection: &ScrapedCollection,
    ) -> Result<Uuid> {
        let row = sqlx::query(
            r#"
            INSERT INTO collections (id, franchise, code, name, source_url, release_date, card_count, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (franchise, code) DO UPDATE SET
                name = EXCLUDED.name,
                source_url = EXCLUDED.source_url,
                release_date = EXCLUDED.release_date,
                card_count = EXCLUDED.card_count,
                scraped_at = EXCLUDED.scraped_at
            RETURNING id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(franchise.as_str())
        .bind(&collection.code)
        .bind(&collection.name)
        .bind(&collection.source_url)
        .bind(&collection.release_date)
        .bind(collection.card_count.map(|c| c as i32))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert collection")?;

        Ok(row.get("id"))
    }

    async fn find_card(&self, collection_id: Uuid, number: &str) -> Result<Option<StoredCard>> {
        let row = sqlx::query(
            r#"
            SELECT id, content_hash
            FROM cards
            WHERE collection_id = $1 AND number = $2
            "#,
        )
        .bind(collection_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up card")?;

        Ok(row.map(|r| StoredCard {
            id: r.get("id"),
            content_hash: r.get("content_hash"),
        }))
    }

    async fn insert_card(
        &self,
        collection_id: Uuid,
        card: &ScrapedCard,
        hash: &ContentHash,
    ) -> Result<Uuid> {
        let id = Uuid::now_v7();
        sqlx::query(
            r#"
            INSERT INTO cards (
                id, collection_id, name, number, rarity, image_url, detail_url,
                extra, content_hash, scraped_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(collection_id)
        .bind(&card.name)
        .bind(&card.number)
        .bind(&card.rarity)
        .bind(&card.image_url)
        .bind(&card.detail_url)
        .bind(&card.extra)
        .bind(hash.to_hex())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert card")?;

        Ok(id)
    }

    async fn update_card(&self, id: Uuid, card: &ScrapedCard, hash: &ContentHash) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE cards SET
                name = $2,
                rarity = $3,
                image_url = $4,
                detail_url = $5,
                extra = $6,
                content_hash = $7,
                scraped_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&card.name)
        .bind(&card.rarity)
        .bind(&card.image_url)
        .bind(&card.detail_url)
        .bind(&card.extra)
        .bind(hash.to_hex())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to update card")?;

        Ok(())
    }
}

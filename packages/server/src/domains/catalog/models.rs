use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CardId, CollectionId};

/// A card collection (set) as scraped from a catalog site.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub id: CollectionId,
    pub franchise: String,
    pub code: String,
    pub name: String,
    pub source_url: String,
    pub release_date: Option<String>,
    pub card_count: Option<i32>,
    pub scraped_at: DateTime<Utc>,
}

/// A single catalog card.
///
/// `extra` holds franchise-specific fields (mana cost, HP, ink color, ...)
/// exactly as the scraper extracted them. `content_hash` is the dedup
/// fingerprint over the extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub id: CardId,
    pub collection_id: CollectionId,
    pub name: String,
    pub number: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    pub extra: serde_json::Value,
    pub content_hash: String,
    pub scraped_at: DateTime<Utc>,
}

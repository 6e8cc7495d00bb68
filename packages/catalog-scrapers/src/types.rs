use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content hash for card-level deduplication.
///
/// Hashed over the extracted fields, not the raw page HTML, so cosmetic
/// markup changes on the catalog site don't force rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub Vec<u8>);

impl ContentHash {
    pub fn from_content(content: &str) -> Self {
        let normalized = normalize_content(content);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        Self(hasher.finalize().to_vec())
    }

    pub fn from_hex(hex_str: &str) -> Option<Self> {
        hex::decode(hex_str).ok().map(Self)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

/// Normalize content for consistent hashing
fn normalize_content(content: &str) -> String {
    content
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A collection (set) discovered on a catalog site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedCollection {
    pub name: String,
    pub code: String,
    pub source_url: String,
    pub release_date: Option<String>,
    pub card_count: Option<u32>,
}

/// A card entry as it appears on a listing page.
///
/// Listing pages don't always carry every field; `detail_url` points at the
/// page that does. Sites that publish everything inline leave it `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSummary {
    pub name: String,
    pub number: String,
    pub detail_url: Option<String>,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    /// Site-specific fields already visible on the listing page.
    pub extra: serde_json::Value,
}

impl CardSummary {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            detail_url: None,
            rarity: None,
            image_url: None,
            extra: serde_json::Value::Null,
        }
    }
}

/// A fully extracted card, ready for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedCard {
    pub name: String,
    pub number: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub detail_url: Option<String>,
    /// Franchise-specific fields (mana cost, HP, ink color, ...).
    pub extra: serde_json::Value,
}

impl ScrapedCard {
    /// Build a card from listing-page data alone (sites without detail pages).
    pub fn from_summary(summary: CardSummary) -> Self {
        Self {
            name: summary.name,
            number: summary.number,
            rarity: summary.rarity,
            image_url: summary.image_url,
            detail_url: summary.detail_url,
            extra: summary.extra,
        }
    }

    /// Fingerprint over the extracted fields for dedup against stored rows.
    pub fn content_hash(&self) -> ContentHash {
        let canonical = serde_json::json!({
            "name": self.name.trim().to_lowercase(),
            "number": self.number.trim().to_lowercase(),
            "rarity": self.rarity.as_deref().map(|r| r.trim().to_lowercase()),
            "image_url": self.image_url,
            "extra": normalize_json(&self.extra),
        });
        ContentHash::from_content(&canonical.to_string())
    }
}

/// Normalize JSON for consistent fingerprinting
fn normalize_json(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::String(s) => serde_json::Value::String(s.trim().to_lowercase()),
        serde_json::Value::Object(map) => {
            let mut normalized = serde_json::Map::new();
            for (k, v) in map {
                normalized.insert(k.clone(), normalize_json(v));
            }
            serde_json::Value::Object(normalized)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(normalize_json).collect())
        }
        other => other.clone(),
    }
}

/// Counters accumulated over one scrape run. Reported in the terminal
/// `done` progress event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTotals {
    pub collections: u32,
    pub cards_inserted: u32,
    pub cards_updated: u32,
    pub cards_unchanged: u32,
    pub warnings: u32,
}

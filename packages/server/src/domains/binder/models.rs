use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CardId, CollectedCardId, UserId};

pub const DEFAULT_CONDITION: &str = "near_mint";
pub const DEFAULT_LANGUAGE: &str = "en";

/// A user-owned copy (or stack of copies) of a catalog card.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollectedCard {
    pub id: CollectedCardId,
    pub user_id: UserId,
    pub card_id: CardId,
    pub quantity: i32,
    pub condition: String,
    pub language: String,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Request payload for adding copies to the binder.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCollectedCard {
    pub card_id: CardId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub condition: Option<String>,
    pub language: Option<String>,
    pub notes: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

/// A binder row joined with the card it refers to, for listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BinderEntry {
    pub id: CollectedCardId,
    pub card_id: CardId,
    pub quantity: i32,
    pub condition: String,
    pub language: String,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub card_name: String,
    pub card_number: String,
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    pub collection_code: String,
    pub franchise: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collected_card_defaults_quantity_to_one() {
        let payload: NewCollectedCard = serde_json::from_str(
            r#"{"card_id": "018f4e8a-0000-7000-8000-000000000001"}"#,
        )
        .unwrap();
        assert_eq!(payload.quantity, 1);
        assert!(payload.condition.is_none());
    }
}

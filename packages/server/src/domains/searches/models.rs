use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{SavedSearchId, UserId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavedSearch {
    pub id: SavedSearchId,
    pub user_id: UserId,
    pub name: String,
    pub query: String,
    /// Marketplace filters as submitted by the client (price range,
    /// condition, ...). Opaque to the server.
    pub filters: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSavedSearch {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub filters: serde_json::Value,
}

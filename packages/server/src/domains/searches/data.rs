use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;

use super::models::{NewSavedSearch, SavedSearch};
use crate::common::{SavedSearchId, UserId};

pub async fn create(pool: &PgPool, user_id: UserId, new: &NewSavedSearch) -> Result<SavedSearch> {
    sqlx::query_as::<_, SavedSearch>(
        r#"
        INSERT INTO saved_searches (id, user_id, name, query, filters, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, name, query, filters, created_at
        "#,
    )
    .bind(SavedSearchId::new())
    .bind(user_id)
    .bind(&new.name)
    .bind(&new.query)
    .bind(&new.filters)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("Failed to create saved search")
}

pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<SavedSearch>> {
    sqlx::query_as::<_, SavedSearch>(
        r#"
        SELECT id, user_id, name, query, filters, created_at
        FROM saved_searches
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list saved searches")
}

pub async fn delete(pool: &PgPool, user_id: UserId, id: SavedSearchId) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM saved_searches
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to delete saved search")?;

    Ok(result.rows_affected() > 0)
}

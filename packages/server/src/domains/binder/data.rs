use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::PgPool;

use super::models::{BinderEntry, CollectedCard, NewCollectedCard, DEFAULT_CONDITION, DEFAULT_LANGUAGE};
use crate::common::{CollectedCardId, UserId};

/// Add copies of a card to a user's binder.
///
/// Upserts on (user, card, condition, language): an existing stack grows by
/// the requested quantity.
pub async fn add_card(
    pool: &PgPool,
    user_id: UserId,
    new: &NewCollectedCard,
) -> Result<CollectedCard> {
    let condition = new.condition.as_deref().unwrap_or(DEFAULT_CONDITION);
    let language = new.language.as_deref().unwrap_or(DEFAULT_LANGUAGE);

    sqlx::query_as::<_, CollectedCard>(
        r#"
        INSERT INTO collected_cards (id, user_id, card_id, quantity, condition, language, notes, added_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id, card_id, condition, language) DO UPDATE SET
            quantity = collected_cards.quantity + EXCLUDED.quantity,
            notes = COALESCE(EXCLUDED.notes, collected_cards.notes)
        RETURNING id, user_id, card_id, quantity, condition, language, notes, added_at
        "#,
    )
    .bind(CollectedCardId::new())
    .bind(user_id)
    .bind(new.card_id)
    .bind(new.quantity)
    .bind(condition)
    .bind(language)
    .bind(&new.notes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .context("Failed to add card to binder")
}

/// Set the quantity of a binder row. Zero (or less) deletes the row.
///
/// Returns the updated row, or None if the row doesn't exist for this user
/// or was deleted.
pub async fn set_quantity(
    pool: &PgPool,
    user_id: UserId,
    id: CollectedCardId,
    quantity: i32,
) -> Result<Option<CollectedCard>> {
    if quantity <= 0 {
        remove(pool, user_id, id).await?;
        return Ok(None);
    }

    sqlx::query_as::<_, CollectedCard>(
        r#"
        UPDATE collected_cards
        SET quantity = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, card_id, quantity, condition, language, notes, added_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await
    .context("Failed to update binder quantity")
}

/// Remove a binder row. Returns whether a row was deleted.
pub async fn remove(pool: &PgPool, user_id: UserId, id: CollectedCardId) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM collected_cards
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await
    .context("Failed to remove card from binder")?;

    Ok(result.rows_affected() > 0)
}

/// List a user's binder with card and collection context.
pub async fn list_for_user(pool: &PgPool, user_id: UserId) -> Result<Vec<BinderEntry>> {
    sqlx::query_as::<_, BinderEntry>(
        r#"
        SELECT cc.id, cc.card_id, cc.quantity, cc.condition, cc.language, cc.notes, cc.added_at,
               c.name AS card_name, c.number AS card_number, c.rarity, c.image_url,
               col.code AS collection_code, col.franchise
        FROM collected_cards cc
        JOIN cards c ON c.id = cc.card_id
        JOIN collections col ON col.id = c.collection_id
        WHERE cc.user_id = $1
        ORDER BY col.franchise, col.code, c.number
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list binder")
}

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::notify::Category;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimelineEvent {
    pub id: i64,
    pub entity_id: i64,
    pub actor_id: Option<i64>,
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

/// Append an event to an entity's timeline. Every successful mutation
/// records one; the unread overlay is derived from them.
pub async fn record(
    pool: &PgPool,
    category: Category,
    entity_id: i64,
    actor_id: Option<i64>,
    action: &str,
    details: &Value,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO timeline_events (category, entity_id, actor_id, action, details)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(category.as_str())
    .bind(entity_id)
    .bind(actor_id)
    .bind(action)
    .bind(details)
    .execute(pool)
    .await?;
    Ok(())
}

/// Recent events for one entity, newest first.
pub async fn events_for(
    pool: &PgPool,
    category: Category,
    entity_id: i64,
    limit: i64,
) -> Result<Vec<TimelineEvent>, AppError> {
    let events = sqlx::query_as::<_, TimelineEvent>(
        "SELECT id, entity_id, actor_id, action, details, created_at
         FROM timeline_events
         WHERE category = $1 AND entity_id = $2
         ORDER BY created_at DESC, id DESC
         LIMIT $3",
    )
    .bind(category.as_str())
    .bind(entity_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// IDs of entities in `category` with at least one event the user has not
/// acknowledged. The user's own actions never count as unread.
pub async fn unread_ids(pool: &PgPool, user_id: i64, category: Category) -> Result<Vec<i64>, AppError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT DISTINCT e.entity_id
         FROM timeline_events e
         WHERE e.category = $1
           AND (e.actor_id IS NULL OR e.actor_id <> $2)
           AND NOT EXISTS (
               SELECT 1 FROM timeline_reads r
               WHERE r.user_id = $2
                 AND r.category = e.category
                 AND r.entity_id = e.entity_id
                 AND r.read_at >= e.created_at
           )",
    )
    .bind(category.as_str())
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Acknowledge an entity for a user: everything on its timeline up to now
/// is considered read.
pub async fn mark_read(
    pool: &PgPool,
    user_id: i64,
    category: Category,
    entity_id: i64,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO timeline_reads (user_id, category, entity_id)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id, category, entity_id) DO UPDATE SET read_at = now()",
    )
    .bind(user_id)
    .bind(category.as_str())
    .bind(entity_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Drop events older than the retention window. Returns the number of
/// rows removed.
pub async fn delete_older_than(pool: &PgPool, days: i32) -> Result<u64, AppError> {
    let result = sqlx::query(
        "DELETE FROM timeline_events WHERE created_at < now() - make_interval(days => $1)",
    )
    .bind(days)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

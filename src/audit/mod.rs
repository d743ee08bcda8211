//! Best-effort audit trail.
//!
//! Every successful mutation appends a timeline event. The same events
//! drive the unread overlay, so auditing an action is also what flags the
//! entity as unread for everyone else. Call sites ignore the result — a
//! failed audit write must never fail the request it describes.

use serde_json::Value;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::timeline;
use crate::notify::Category;

const RETENTION_DAYS: i32 = 180;

/// Record an action against an entity.
pub async fn log(
    pool: &PgPool,
    actor_id: i64,
    action: &str,
    category: Category,
    entity_id: i64,
    details: Value,
) -> Result<(), AppError> {
    timeline::record(pool, category, entity_id, Some(actor_id), action, &details).await
}

/// Drop timeline entries past the retention window. Runs at startup.
pub async fn cleanup_old_entries(pool: &PgPool) {
    match timeline::delete_older_than(pool, RETENTION_DAYS).await {
        Ok(0) => {}
        Ok(n) => log::info!("Audit cleanup: removed {n} events older than {RETENTION_DAYS} days"),
        Err(e) => log::warn!("Audit cleanup failed: {e}"),
    }
}

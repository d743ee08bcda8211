use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub org_kind: String,
    pub status: String,
    pub contact_email: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str =
    "id, name, org_kind, status, contact_email, rejection_reason, created_at, updated_at";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Organization>, AppError> {
    let org = sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(org)
}

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Organization>, AppError> {
    let org = sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE name = $1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(org)
}

pub async fn create(
    pool: &PgPool,
    name: &str,
    org_kind: &str,
    contact_email: &str,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO organizations (name, org_kind, contact_email)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(name)
    .bind(org_kind)
    .bind(contact_email)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn count(pool: &PgPool, status: Option<&str>) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM organizations
         WHERE ($1::text IS NULL OR status = $1)",
    )
    .bind(status)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn list_page(
    pool: &PgPool,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Organization>, AppError> {
    let orgs = sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(orgs)
}

/// State-checked status update. Returns false when the row was not in
/// `from` anymore — the caller lost a race and should re-fetch.
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    from: &str,
    to: &str,
    rejection_reason: Option<&str>,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE organizations
         SET status = $3, rejection_reason = COALESCE($4, rejection_reason), updated_at = now()
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(rejection_reason)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

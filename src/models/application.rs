use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub candidate_name: String,
    pub candidate_email: String,
    pub vendor_org_id: Option<i64>,
    pub status: String,
    pub decision_feedback: Option<String>,
    pub decided_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, job_id, candidate_name, candidate_email, vendor_org_id, status, \
                       decision_feedback, decided_by, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    job_id: i64,
    candidate_name: &str,
    candidate_email: &str,
    vendor_org_id: Option<i64>,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO applications (job_id, candidate_name, candidate_email, vendor_org_id)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(job_id)
    .bind(candidate_name)
    .bind(candidate_email)
    .bind(vendor_org_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Application>, AppError> {
    let app = sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM applications WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(app)
}

/// `visible_org = Some(org)` restricts to submissions from that
/// organization (the vendor view); `None` sees everything.
pub async fn count(
    pool: &PgPool,
    status: Option<&str>,
    job_id: Option<i64>,
    visible_org: Option<i64>,
) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM applications
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::bigint IS NULL OR job_id = $2)
           AND ($3::bigint IS NULL OR vendor_org_id = $3)",
    )
    .bind(status)
    .bind(job_id)
    .bind(visible_org)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn list_page(
    pool: &PgPool,
    status: Option<&str>,
    job_id: Option<i64>,
    visible_org: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Application>, AppError> {
    let apps = sqlx::query_as::<_, Application>(&format!(
        "SELECT {COLUMNS} FROM applications
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::bigint IS NULL OR job_id = $2)
           AND ($3::bigint IS NULL OR vendor_org_id = $3)
         ORDER BY created_at DESC
         LIMIT $4 OFFSET $5"
    ))
    .bind(status)
    .bind(job_id)
    .bind(visible_org)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(apps)
}

/// State-checked status update. Returns false when the row was not in
/// `from` anymore — the caller lost a race and should re-fetch.
pub async fn update_status(pool: &PgPool, id: i64, from: &str, to: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE applications SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Stakeholder decision: the status change plus the mandatory feedback
/// and the deciding user, in one state-checked update.
pub async fn record_decision(
    pool: &PgPool,
    id: i64,
    from: &str,
    to: &str,
    feedback: &str,
    decided_by: i64,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE applications
         SET status = $3, decision_feedback = $4, decided_by = $5, updated_at = now()
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(feedback)
    .bind(decided_by)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::errors::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub org_id: Option<i64>,
    pub created_by: i64,
    pub skills: String,
    pub experience: String,
    pub requirements: String,
    pub roles_responsibilities: String,
    pub bill_rate: Option<f64>,
    pub pay_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, title, description, status, org_id, created_by, skills, experience, \
                       requirements, roles_responsibilities, bill_rate, pay_rate, created_at, updated_at";

pub async fn create(
    pool: &PgPool,
    title: &str,
    description: &str,
    org_id: Option<i64>,
    created_by: i64,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO jobs (title, description, org_id, created_by)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(title)
    .bind(description)
    .bind(org_id)
    .bind(created_by)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Job>, AppError> {
    let job = sqlx::query_as::<_, Job>(&format!("SELECT {COLUMNS} FROM jobs WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(job)
}

/// `visible_org = Some(org)` restricts to that organization's own postings
/// plus anything published (the vendor view); `None` sees everything.
pub async fn count(
    pool: &PgPool,
    status: Option<&str>,
    visible_org: Option<i64>,
) -> Result<i64, AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM jobs
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::bigint IS NULL OR org_id = $2 OR status = 'PUBLISHED')",
    )
    .bind(status)
    .bind(visible_org)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn list_page(
    pool: &PgPool,
    status: Option<&str>,
    visible_org: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Job>, AppError> {
    let jobs = sqlx::query_as::<_, Job>(&format!(
        "SELECT {COLUMNS} FROM jobs
         WHERE ($1::text IS NULL OR status = $1)
           AND ($2::bigint IS NULL OR org_id = $2 OR status = 'PUBLISHED')
         ORDER BY created_at DESC
         LIMIT $3 OFFSET $4"
    ))
    .bind(status)
    .bind(visible_org)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(jobs)
}

/// State-checked status update. Returns false when the row was not in
/// `from` anymore — the caller lost a race and should re-fetch.
pub async fn update_status(pool: &PgPool, id: i64, from: &str, to: &str) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE jobs SET status = $3, updated_at = now() WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Enrichment: store the sourcing payload and advance the status in one
/// state-checked update.
#[allow(clippy::too_many_arguments)]
pub async fn enrich(
    pool: &PgPool,
    id: i64,
    from: &str,
    to: &str,
    skills: &str,
    experience: &str,
    requirements: &str,
    roles_responsibilities: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE jobs
         SET skills = $4, experience = $5, requirements = $6, roles_responsibilities = $7,
             status = $3, updated_at = now()
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(skills)
    .bind(experience)
    .bind(requirements)
    .bind(roles_responsibilities)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Final verification: record the agreed rates and advance the status in
/// one state-checked update.
pub async fn set_rates(
    pool: &PgPool,
    id: i64,
    from: &str,
    to: &str,
    bill_rate: f64,
    pay_rate: f64,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        "UPDATE jobs
         SET bill_rate = $4, pay_rate = $5, status = $3, updated_at = now()
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .bind(bill_rate)
    .bind(pay_rate)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

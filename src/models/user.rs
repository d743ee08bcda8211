use sqlx::PgPool;

use crate::errors::AppError;

/// Internal user struct for authentication — includes password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub org_id: Option<i64>,
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, role, org_id
         FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: &str,
    org_id: Option<i64>,
) -> Result<i64, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash, role, org_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(org_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Permission codes granted to a role.
pub async fn permission_codes(pool: &PgPool, role: &str) -> Result<Vec<String>, AppError> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT permission FROM role_permissions WHERE role = $1 ORDER BY permission",
    )
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(codes)
}

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::rate_limit::RateLimiter;
use crate::auth::session::{current_actor, get_username};
use crate::auth::{csrf, password};
use crate::errors::AppError;
use crate::models::{organization, user};
use crate::workflow::OrgKind;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// POST /login
/// Authenticates and primes the session. The response carries the CSRF
/// token mutating requests must echo in the `X-Csrf-Token` header.
pub async fn login(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Json<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    // Rate-limit check BEFORE any database access
    let ip = req
        .peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or_else(|| std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED));

    if limiter.is_blocked(ip) {
        return Ok(HttpResponse::TooManyRequests()
            .json(json!({"error": "Too many failed login attempts. Please try again later."})));
    }

    let found = user::find_by_username(&pool, &form.username).await?;

    let Some(u) = found else {
        limiter.record_failure(ip);
        return Ok(HttpResponse::Unauthorized().json(json!({"error": "invalid credentials"})));
    };

    if !password::verify(&form.password, &u.password_hash) {
        limiter.record_failure(ip);
        return Ok(HttpResponse::Unauthorized().json(json!({"error": "invalid credentials"})));
    }

    limiter.clear(ip);

    // Users without an organization row are internal staff.
    let org_kind = match u.org_id {
        Some(org_id) => organization::find_by_id(&pool, org_id)
            .await?
            .map(|o| o.org_kind)
            .unwrap_or_else(|| OrgKind::Solventek.as_str().to_string()),
        None => OrgKind::Solventek.as_str().to_string(),
    };

    let perms = user::permission_codes(&pool, &u.role).await?;
    let perms_csv = perms.join(",");

    let _ = session.insert("user_id", u.id);
    let _ = session.insert("username", &u.username);
    let _ = session.insert("role", &u.role);
    let _ = session.insert("org_kind", &org_kind);
    if let Some(org_id) = u.org_id {
        let _ = session.insert("org_id", org_id);
    }
    let _ = session.insert("permissions", &perms_csv);

    let csrf_token = csrf::get_or_create_token(&session);

    Ok(HttpResponse::Ok().json(json!({
        "userId": u.id,
        "username": u.username,
        "role": u.role,
        "orgId": u.org_id,
        "orgKind": org_kind,
        "permissions": perms,
        "csrfToken": csrf_token,
    })))
}

/// POST /logout
pub async fn logout(session: Session, req: HttpRequest) -> Result<HttpResponse, AppError> {
    csrf::require_csrf(&session, &req)?;
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}

/// GET /me
pub async fn me(session: Session) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let username = get_username(&session).map_err(AppError::Session)?;
    Ok(HttpResponse::Ok().json(json!({
        "userId": actor.user_id,
        "username": username,
        "role": actor.role,
        "orgId": actor.org_id,
        "orgKind": actor.org_kind,
        "permissions": actor.permissions.0,
    })))
}

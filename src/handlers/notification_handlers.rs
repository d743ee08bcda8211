use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::session::current_actor;
use crate::errors::AppError;
use crate::models::timeline;
use crate::notify::{Category, NotificationOverlay};

/// GET /notifications/{category}/unread
/// The caller's unread entity IDs for one category. A failed query
/// answers an empty set — clients badge nothing rather than erroring.
pub async fn unread(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let category = Category::parse(&path.into_inner()).ok_or(AppError::NotFound)?;

    let overlay = NotificationOverlay::from_fetch(
        category,
        timeline::unread_ids(&pool, actor.user_id, category).await,
    );

    let mut ids: Vec<i64> = overlay.unread_ids().iter().copied().collect();
    ids.sort_unstable();

    Ok(HttpResponse::Ok().json(json!({
        "category": category,
        "unreadIds": ids,
    })))
}

/// POST /notifications/{category}/{id}/read
/// Explicit acknowledgement, for list rows dismissed without opening the
/// detail view.
pub async fn mark_read(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;

    let (category_tag, entity_id) = path.into_inner();
    let category = Category::parse(&category_tag).ok_or(AppError::NotFound)?;

    timeline::mark_read(&pool, actor.user_id, category, entity_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

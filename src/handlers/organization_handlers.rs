use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::auth::session::current_actor;
use crate::auth::{csrf, password, validate};
use crate::errors::AppError;
use crate::handlers::{Page, paging, timeline_json};
use crate::models::organization::Organization;
use crate::models::{organization, timeline, user};
use crate::notify::{Category, NotificationOverlay, prioritize_by};
use crate::workflow::organization::{LIFECYCLE, OrgState};
use crate::workflow::{Actor, OrgKind, Role, Subject};

// ---------------------------------------------------------------------------
// Form and response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectForm {
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrgItem {
    pub id: i64,
    pub name: String,
    pub org_kind: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub unread: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOrgDetail {
    pub id: i64,
    pub name: String,
    pub org_kind: String,
    pub status: String,
    pub contact_email: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for ApiOrgDetail {
    fn from(o: Organization) -> Self {
        Self {
            id: o.id,
            name: o.name,
            org_kind: o.org_kind,
            status: o.status,
            contact_email: o.contact_email,
            rejection_reason: o.rejection_reason,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionInfo {
    pub name: &'static str,
    pub to: &'static str,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject carries a mandatory reason and has a dedicated route.
const SIMPLE_TRANSITIONS: &[&str] = &["approve", "activate", "deactivate"];

fn org_subject(o: &Organization) -> Result<Subject<OrgState>, AppError> {
    let state = OrgState::parse(&o.status).ok_or_else(|| {
        AppError::Internal(format!("organization {} has unknown state '{}'", o.id, o.status))
    })?;
    Ok(Subject {
        state,
        owning_org: Some(o.id),
    })
}

fn require_internal(actor: &Actor) -> Result<(), AppError> {
    if actor.role == Role::Vendor {
        return Err(AppError::PermissionDenied("organization".to_string()));
    }
    Ok(())
}

async fn load_org(pool: &PgPool, actor: &Actor, id: i64) -> Result<Organization, AppError> {
    let o = organization::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    // Vendors may look at their own organization only.
    if actor.role == Role::Vendor && actor.org_id != Some(o.id) {
        return Err(AppError::PermissionDenied("organization".to_string()));
    }
    Ok(o)
}

fn available(actor: &Actor, subject: &Subject<OrgState>) -> Vec<TransitionInfo> {
    LIFECYCLE
        .available(actor, subject)
        .into_iter()
        .map(|r| TransitionInfo {
            name: r.name,
            to: r.to.as_str(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /organizations/register
/// Public vendor self-registration: the organization plus its first user
/// account. The organization starts in PENDING_VERIFICATION and stays
/// there until an internal admin resolves it.
pub async fn register(
    pool: web::Data<PgPool>,
    form: web::Json<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    if let Some(msg) = validate::validate_org_name(&form.name) {
        return Err(AppError::Validation(msg));
    }
    if let Some(msg) = validate::validate_username(&form.username) {
        return Err(AppError::Validation(msg));
    }
    if let Some(msg) = validate::validate_password(&form.password) {
        return Err(AppError::Validation(msg));
    }
    if !form.email.trim().is_empty() {
        if let Some(msg) = validate::validate_email(&form.email) {
            return Err(AppError::Validation(msg));
        }
    }

    let name = form.name.trim();
    if organization::find_by_name(&pool, name).await?.is_some() {
        return Err(AppError::Validation(
            "organization name already taken".to_string(),
        ));
    }
    if user::find_by_username(&pool, form.username.trim()).await?.is_some() {
        return Err(AppError::Validation("username already taken".to_string()));
    }

    let org_id =
        organization::create(&pool, name, OrgKind::Vendor.as_str(), form.contact_email.trim())
            .await?;

    let hash = password::hash(&form.password)?;
    let user_id = user::create(
        &pool,
        form.username.trim(),
        form.email.trim(),
        &hash,
        Role::Vendor.as_str(),
        Some(org_id),
    )
    .await?;

    let details = json!({
        "name": name,
        "summary": format!("Vendor organization '{name}' registered"),
    });
    let _ = crate::audit::log(
        &pool,
        user_id,
        "organization.registered",
        Category::Organization,
        org_id,
        details,
    )
    .await;

    Ok(HttpResponse::Created().json(json!({
        "organizationId": org_id,
        "userId": user_id,
        "status": OrgState::PendingVerification,
    })))
}

/// GET /organizations
/// Internal-only paginated list: unread organizations first, then
/// reverse-chronological. Query params: status, page, per_page.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    require_internal(&actor)?;

    let status = match query.get("status") {
        Some(s) => Some(
            OrgState::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown organization status '{s}'")))?,
        ),
        None => None,
    };
    let status_tag = status.map(|s| s.as_str());
    let (page, per_page) = paging(&query);

    let total = organization::count(&pool, status_tag).await?;
    let orgs = organization::list_page(&pool, status_tag, per_page, (page - 1) * per_page).await?;

    let overlay = NotificationOverlay::from_fetch(
        Category::Organization,
        timeline::unread_ids(&pool, actor.user_id, Category::Organization).await,
    );

    let orgs = prioritize_by(orgs, overlay.unread_ids(), |o| o.id, |o| Reverse(o.created_at));

    let content: Vec<ApiOrgItem> = orgs
        .into_iter()
        .map(|o| ApiOrgItem {
            unread: overlay.is_unread(o.id),
            id: o.id,
            name: o.name,
            org_kind: o.org_kind,
            status: o.status,
            created_at: o.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(content, total, page, per_page)))
}

/// GET /organizations/{id}
/// Opening the detail acknowledges the organization for the caller.
pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let id = path.into_inner();
    let o = load_org(&pool, &actor, id).await?;

    if let Err(e) = timeline::mark_read(&pool, actor.user_id, Category::Organization, id).await {
        log::warn!(
            "failed to mark organization {id} read for user {}: {e}",
            actor.user_id
        );
    }

    let subject = org_subject(&o)?;
    let transitions = available(&actor, &subject);
    let events = timeline::events_for(&pool, Category::Organization, id, 20).await?;

    Ok(HttpResponse::Ok().json(json!({
        "organization": ApiOrgDetail::from(o),
        "availableTransitions": transitions,
        "timeline": timeline_json(&events),
    })))
}

/// GET /organizations/{id}/transitions
pub async fn transitions(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let o = load_org(&pool, &actor, path.into_inner()).await?;
    let subject = org_subject(&o)?;
    Ok(HttpResponse::Ok().json(available(&actor, &subject)))
}

/// POST /organizations/{id}/{action}
/// Payload-less transitions: approve, activate, deactivate.
pub async fn transition(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, AppError> {
    let (id, action) = path.into_inner();
    if !SIMPLE_TRANSITIONS.contains(&action.as_str()) {
        return Err(AppError::NotFound);
    }

    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;

    let o = load_org(&pool, &actor, id).await?;
    let subject = org_subject(&o)?;
    let Some(rule) = LIFECYCLE.rule(&action) else {
        return Err(AppError::NotFound);
    };
    if !rule.allows(&actor, &subject) {
        return Err(AppError::PermissionDenied(action.clone()));
    }

    let updated =
        organization::update_status(&pool, id, subject.state.as_str(), rule.to.as_str(), None)
            .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "organization {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": rule.to,
        "summary": format!("Organization '{}' moved {} -> {}", o.name, subject.state, rule.to),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        &format!("organization.{action}"),
        Category::Organization,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": rule.to})))
}

/// POST /organizations/{id}/reject
/// Rejection is final for this record and carries a mandatory reason;
/// a rejected vendor registers again, it is never resurrected.
pub async fn reject(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<RejectForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let id = path.into_inner();

    let reason = form.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("reason is required".to_string()));
    }

    let o = load_org(&pool, &actor, id).await?;
    let subject = org_subject(&o)?;
    let Some(rule) = LIFECYCLE.rule("reject") else {
        return Err(AppError::Internal("reject rule missing".to_string()));
    };
    if !rule.allows(&actor, &subject) {
        return Err(AppError::PermissionDenied("reject".to_string()));
    }

    let updated = organization::update_status(
        &pool,
        id,
        subject.state.as_str(),
        rule.to.as_str(),
        Some(reason),
    )
    .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "organization {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": rule.to,
        "reason": reason,
        "summary": format!("Organization '{}' rejected", o.name),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        "organization.rejected",
        Category::Organization,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": rule.to})))
}

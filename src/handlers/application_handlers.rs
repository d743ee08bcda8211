use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::auth::csrf;
use crate::auth::session::current_actor;
use crate::errors::AppError;
use crate::handlers::{Page, paging, timeline_json};
use crate::models::application::Application;
use crate::models::{application, job, timeline};
use crate::notify::{Category, NotificationOverlay, prioritize_by};
use crate::workflow::application::{
    ApplicationState, available_statuses, can_decide, can_update_status, decision_target,
};
use crate::workflow::job::JobState;
use crate::workflow::{Actor, Role, Subject};

// ---------------------------------------------------------------------------
// Form and response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionForm {
    pub approved: bool,
    pub feedback: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiApplicationItem {
    pub id: i64,
    pub job_id: i64,
    pub candidate_name: String,
    pub vendor_org_id: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub unread: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiApplicationDetail {
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

impl From<Application> for ApiApplicationDetail {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            candidate_name: a.candidate_name,
            candidate_email: a.candidate_email,
            vendor_org_id: a.vendor_org_id,
            status: a.status,
            decision_feedback: a.decision_feedback,
            decided_by: a.decided_by,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// For applications the owning organization is the submitting vendor.
fn app_subject(a: &Application) -> Result<Subject<ApplicationState>, AppError> {
    let state = ApplicationState::parse(&a.status).ok_or_else(|| {
        AppError::Internal(format!("application {} has unknown state '{}'", a.id, a.status))
    })?;
    Ok(Subject {
        state,
        owning_org: a.vendor_org_id,
    })
}

/// Vendors see only their own submissions.
fn visible_org(actor: &Actor) -> Option<i64> {
    if actor.role == Role::Vendor {
        actor.org_id
    } else {
        None
    }
}

async fn load_application(pool: &PgPool, actor: &Actor, id: i64) -> Result<Application, AppError> {
    let a = application::find_by_id(pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if actor.role == Role::Vendor && !actor.owns(a.vendor_org_id) {
        return Err(AppError::PermissionDenied("application".to_string()));
    }
    Ok(a)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /jobs/{id}/applications
/// Submit a candidate against a published posting. Vendors submit for
/// their own organization; internal recruiters submit directly.
pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<ApplicationForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let job_id = path.into_inner();

    match actor.role {
        Role::SuperAdmin | Role::HrAdmin | Role::Ta | Role::Vendor => {}
        Role::Employee => {
            return Err(AppError::PermissionDenied("application".to_string()));
        }
    }

    let candidate = form.candidate_name.trim();
    if candidate.is_empty() {
        return Err(AppError::Validation("candidateName is required".to_string()));
    }

    let j = job::find_by_id(&pool, job_id).await?.ok_or(AppError::NotFound)?;
    if j.status != JobState::Published.as_str() {
        return Err(AppError::Validation(
            "job is not open for applications".to_string(),
        ));
    }

    let vendor_org = if actor.role == Role::Vendor {
        actor.org_id
    } else {
        None
    };
    let id = application::create(&pool, job_id, candidate, form.candidate_email.trim(), vendor_org)
        .await?;

    let details = json!({
        "jobId": job_id,
        "candidateName": candidate,
        "summary": format!("Candidate '{candidate}' applied to job #{job_id}"),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        "application.created",
        Category::Application,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Created().json(json!({"id": id, "status": ApplicationState::Applied})))
}

/// GET /applications
/// Paginated pipeline: unread applications first, then
/// reverse-chronological. Query params: status, job_id, page, per_page.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;

    let status = match query.get("status") {
        Some(s) => Some(
            ApplicationState::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown application status '{s}'")))?,
        ),
        None => None,
    };
    let status_tag = status.map(|s| s.as_str());
    let job_id = query.get("job_id").and_then(|s| s.parse::<i64>().ok());
    let (page, per_page) = paging(&query);
    let visible = visible_org(&actor);

    let total = application::count(&pool, status_tag, job_id, visible).await?;
    let apps = application::list_page(
        &pool,
        status_tag,
        job_id,
        visible,
        per_page,
        (page - 1) * per_page,
    )
    .await?;

    let overlay = NotificationOverlay::from_fetch(
        Category::Application,
        timeline::unread_ids(&pool, actor.user_id, Category::Application).await,
    );

    let apps = prioritize_by(apps, overlay.unread_ids(), |a| a.id, |a| Reverse(a.created_at));

    let content: Vec<ApiApplicationItem> = apps
        .into_iter()
        .map(|a| ApiApplicationItem {
            unread: overlay.is_unread(a.id),
            id: a.id,
            job_id: a.job_id,
            candidate_name: a.candidate_name,
            vendor_org_id: a.vendor_org_id,
            status: a.status,
            created_at: a.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(content, total, page, per_page)))
}

/// GET /applications/{id}
/// Full application, its timeline, and the statuses the caller may move
/// it to. Opening the detail acknowledges it for the caller.
pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let id = path.into_inner();
    let a = load_application(&pool, &actor, id).await?;

    if let Err(e) = timeline::mark_read(&pool, actor.user_id, Category::Application, id).await {
        log::warn!(
            "failed to mark application {id} read for user {}: {e}",
            actor.user_id
        );
    }

    let subject = app_subject(&a)?;
    let statuses = available_statuses(&actor, &subject);
    let events = timeline::events_for(&pool, Category::Application, id, 20).await?;

    Ok(HttpResponse::Ok().json(json!({
        "application": ApiApplicationDetail::from(a),
        "availableStatuses": statuses,
        "canDecide": can_decide(&actor),
        "timeline": timeline_json(&events),
    })))
}

/// GET /applications/{id}/transitions
pub async fn transitions(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let a = load_application(&pool, &actor, path.into_inner()).await?;
    let subject = app_subject(&a)?;
    Ok(HttpResponse::Ok().json(json!({
        "availableStatuses": available_statuses(&actor, &subject),
        "canDecide": can_decide(&actor),
    })))
}

/// POST /applications/{id}/status
/// Generic pipeline move. Internal recruiting roles may set any other
/// status; the submitting vendor may only withdraw (DROPPED).
pub async fn update_status(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<StatusForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let id = path.into_inner();

    let to = ApplicationState::parse(&form.status).ok_or_else(|| {
        AppError::Validation(format!("unknown application status '{}'", form.status))
    })?;

    let a = load_application(&pool, &actor, id).await?;
    let subject = app_subject(&a)?;
    if !can_update_status(&actor, &subject, to) {
        return Err(AppError::PermissionDenied("status update".to_string()));
    }

    let updated = application::update_status(&pool, id, subject.state.as_str(), to.as_str()).await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "application {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": to,
        "summary": format!(
            "Application of '{}' moved {} -> {}",
            a.candidate_name, subject.state, to
        ),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        "application.status_changed",
        Category::Application,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": to})))
}

/// POST /applications/{id}/decision
/// Stakeholder approve/reject with mandatory feedback. The decision is
/// metadata alongside a status change to OFFERED or REJECTED, not a
/// distinct state.
pub async fn decision(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<DecisionForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let id = path.into_inner();

    if !can_decide(&actor) {
        return Err(AppError::PermissionDenied("decision".to_string()));
    }

    let feedback = form.feedback.trim();
    if feedback.is_empty() {
        return Err(AppError::Validation("feedback is required".to_string()));
    }

    let a = load_application(&pool, &actor, id).await?;
    let subject = app_subject(&a)?;
    let to = decision_target(form.approved);

    let updated = application::record_decision(
        &pool,
        id,
        subject.state.as_str(),
        to.as_str(),
        feedback,
        actor.user_id,
    )
    .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "application {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "approved": form.approved,
        "feedback": feedback,
        "from": subject.state,
        "to": to,
        "summary": format!(
            "Application of '{}' {}",
            a.candidate_name,
            if form.approved { "approved" } else { "rejected" }
        ),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        "application.decision",
        Category::Application,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": to, "approved": form.approved})))
}

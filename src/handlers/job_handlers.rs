use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use std::cmp::Reverse;
use std::collections::HashMap;

use crate::auth::csrf;
use crate::auth::session::{current_actor, require_permission};
use crate::errors::AppError;
use crate::handlers::{Page, paging, timeline_json};
use crate::models::job::Job;
use crate::models::{job, timeline};
use crate::notify::{Category, NotificationOverlay, prioritize_by};
use crate::workflow::job::{JobState, LIFECYCLE};
use crate::workflow::{Actor, Role, Subject};

// ---------------------------------------------------------------------------
// Form and response structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JobForm {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichForm {
    pub skills: String,
    pub experience: String,
    pub requirements: String,
    pub roles_and_responsibilities: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatesForm {
    pub bill_rate: f64,
    pub pay_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiJobItem {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub org_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub unread: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiJobDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub org_id: Option<i64>,
    pub created_by: i64,
    pub skills: String,
    pub experience: String,
    pub requirements: String,
    pub roles_and_responsibilities: String,
    pub bill_rate: Option<f64>,
    pub pay_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for ApiJobDetail {
    fn from(j: Job) -> Self {
        Self {
            id: j.id,
            title: j.title,
            description: j.description,
            status: j.status,
            org_id: j.org_id,
            created_by: j.created_by,
            skills: j.skills,
            experience: j.experience,
            requirements: j.requirements,
            roles_and_responsibilities: j.roles_responsibilities,
            bill_rate: j.bill_rate,
            pay_rate: j.pay_rate,
            created_at: j.created_at,
            updated_at: j.updated_at,
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

/// Transitions the generic endpoint accepts; enrich and final_verify carry
/// payloads and have dedicated routes.
const SIMPLE_TRANSITIONS: &[&str] = &["submit", "verify", "publish", "pause", "resume", "close"];

fn job_subject(j: &Job) -> Result<Subject<JobState>, AppError> {
    let state = JobState::parse(&j.status)
        .ok_or_else(|| AppError::Internal(format!("job {} has unknown state '{}'", j.id, j.status)))?;
    Ok(Subject {
        state,
        owning_org: j.org_id,
    })
}

/// Vendors see their own postings plus anything published.
fn visible_org(actor: &Actor) -> Option<i64> {
    if actor.role == Role::Vendor {
        actor.org_id
    } else {
        None
    }
}

fn can_view(actor: &Actor, j: &Job) -> bool {
    actor.role != Role::Vendor
        || actor.owns(j.org_id)
        || j.status == JobState::Published.as_str()
}

async fn load_job(pool: &PgPool, actor: &Actor, id: i64) -> Result<Job, AppError> {
    let j = job::find_by_id(pool, id).await?.ok_or(AppError::NotFound)?;
    if !can_view(actor, &j) {
        return Err(AppError::PermissionDenied("job".to_string()));
    }
    Ok(j)
}

fn available(actor: &Actor, subject: &Subject<JobState>) -> Vec<TransitionInfo> {
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

/// POST /jobs
/// Create a draft posting owned by the caller's organization.
pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    form: web::Json<JobForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "JOB_CREATE")?;
    csrf::require_csrf(&session, &req)?;
    let actor = current_actor(&session)?;

    let title = form.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let id = job::create(&pool, title, form.description.trim(), actor.org_id, actor.user_id).await?;

    let details = json!({
        "title": title,
        "summary": format!("Created job posting '{title}'"),
    });
    let _ = crate::audit::log(&pool, actor.user_id, "job.created", Category::Job, id, details).await;

    Ok(HttpResponse::Created().json(json!({"id": id, "status": JobState::Draft})))
}

/// GET /jobs
/// Paginated board: unread postings first, then reverse-chronological.
/// Query params: status (filter), page, per_page.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    query: web::Query<HashMap<String, String>>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;

    let status = match query.get("status") {
        Some(s) => Some(
            JobState::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown job status '{s}'")))?,
        ),
        None => None,
    };
    let status_tag = status.map(|s| s.as_str());
    let (page, per_page) = paging(&query);
    let visible = visible_org(&actor);

    let total = job::count(&pool, status_tag, visible).await?;
    let jobs = job::list_page(&pool, status_tag, visible, per_page, (page - 1) * per_page).await?;

    // The unread set and the entity page are independent fetches; a broken
    // unread query degrades to "nothing unread" and the list still renders.
    let overlay = NotificationOverlay::from_fetch(
        Category::Job,
        timeline::unread_ids(&pool, actor.user_id, Category::Job).await,
    );

    let jobs = prioritize_by(jobs, overlay.unread_ids(), |j| j.id, |j| Reverse(j.created_at));

    let content: Vec<ApiJobItem> = jobs
        .into_iter()
        .map(|j| ApiJobItem {
            unread: overlay.is_unread(j.id),
            id: j.id,
            title: j.title,
            status: j.status,
            org_id: j.org_id,
            created_at: j.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(Page::new(content, total, page, per_page)))
}

/// GET /jobs/{id}
/// Full posting, its timeline, and the transitions the caller may apply.
/// Opening the detail acknowledges the posting for the caller.
pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let id = path.into_inner();
    let j = load_job(&pool, &actor, id).await?;

    if let Err(e) = timeline::mark_read(&pool, actor.user_id, Category::Job, id).await {
        log::warn!("failed to mark job {id} read for user {}: {e}", actor.user_id);
    }

    let subject = job_subject(&j)?;
    let transitions = available(&actor, &subject);
    let events = timeline::events_for(&pool, Category::Job, id, 20).await?;

    Ok(HttpResponse::Ok().json(json!({
        "job": ApiJobDetail::from(j),
        "availableTransitions": transitions,
        "timeline": timeline_json(&events),
    })))
}

/// GET /jobs/{id}/transitions
pub async fn transitions(
    pool: web::Data<PgPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    let j = load_job(&pool, &actor, path.into_inner()).await?;
    let subject = job_subject(&j)?;
    Ok(HttpResponse::Ok().json(available(&actor, &subject)))
}

/// POST /jobs/{id}/{action}
/// Payload-less transitions: submit, verify, publish, pause, resume, close.
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

    let j = load_job(&pool, &actor, id).await?;
    let subject = job_subject(&j)?;
    let Some(rule) = LIFECYCLE.rule(&action) else {
        return Err(AppError::NotFound);
    };
    if !rule.allows(&actor, &subject) {
        return Err(AppError::PermissionDenied(action.clone()));
    }

    // The guard pass above is advisory; the state-checked update is the
    // final authority and loses cleanly to concurrent movers.
    let updated = job::update_status(&pool, id, subject.state.as_str(), rule.to.as_str()).await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "job {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": rule.to,
        "summary": format!("Job '{}' moved {} -> {}", j.title, subject.state, rule.to),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        &format!("job.{action}"),
        Category::Job,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": rule.to})))
}

/// POST /jobs/{id}/enrich
/// The sourcing enrichment transition. The payload is structurally
/// required — every field must be non-empty — but that is caller-side
/// validation, not part of the guard.
pub async fn enrich(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<EnrichForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let id = path.into_inner();

    let j = load_job(&pool, &actor, id).await?;
    let subject = job_subject(&j)?;
    let Some(rule) = LIFECYCLE.rule("enrich") else {
        return Err(AppError::Internal("enrich rule missing".to_string()));
    };
    if !rule.allows(&actor, &subject) {
        return Err(AppError::PermissionDenied("enrich".to_string()));
    }

    for (field, value) in [
        ("skills", &form.skills),
        ("experience", &form.experience),
        ("requirements", &form.requirements),
        ("rolesAndResponsibilities", &form.roles_and_responsibilities),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    let updated = job::enrich(
        &pool,
        id,
        subject.state.as_str(),
        rule.to.as_str(),
        form.skills.trim(),
        form.experience.trim(),
        form.requirements.trim(),
        form.roles_and_responsibilities.trim(),
    )
    .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "job {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": rule.to,
        "summary": format!("Job '{}' enriched with sourcing details", j.title),
    });
    let _ = crate::audit::log(&pool, actor.user_id, "job.enriched", Category::Job, id, details).await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": rule.to})))
}

/// POST /jobs/{id}/final_verify
/// Records the agreed bill/pay rates and advances to final verification.
pub async fn final_verify(
    pool: web::Data<PgPool>,
    session: Session,
    req: HttpRequest,
    path: web::Path<i64>,
    form: web::Json<RatesForm>,
) -> Result<HttpResponse, AppError> {
    let actor = current_actor(&session)?;
    csrf::require_csrf(&session, &req)?;
    let id = path.into_inner();

    let j = load_job(&pool, &actor, id).await?;
    let subject = job_subject(&j)?;
    let Some(rule) = LIFECYCLE.rule("final_verify") else {
        return Err(AppError::Internal("final_verify rule missing".to_string()));
    };
    if !rule.allows(&actor, &subject) {
        return Err(AppError::PermissionDenied("final_verify".to_string()));
    }

    if form.bill_rate <= 0.0 {
        return Err(AppError::Validation("billRate must be positive".to_string()));
    }
    if form.pay_rate <= 0.0 {
        return Err(AppError::Validation("payRate must be positive".to_string()));
    }

    let updated = job::set_rates(
        &pool,
        id,
        subject.state.as_str(),
        rule.to.as_str(),
        form.bill_rate,
        form.pay_rate,
    )
    .await?;
    if !updated {
        return Err(AppError::Conflict(format!(
            "job {id} changed state, refresh and retry"
        )));
    }

    let details = json!({
        "from": subject.state,
        "to": rule.to,
        "billRate": form.bill_rate,
        "payRate": form.pay_rate,
        "summary": format!("Job '{}' passed final verification", j.title),
    });
    let _ = crate::audit::log(
        &pool,
        actor.user_id,
        "job.final_verified",
        Category::Job,
        id,
        details,
    )
    .await;

    Ok(HttpResponse::Ok().json(json!({"id": id, "status": rule.to})))
}

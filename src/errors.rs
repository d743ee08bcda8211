use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Db(sqlx::Error),
    Session(String),
    PermissionDenied(String),
    Validation(String),
    Conflict(String),
    NotFound,
    Hash(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::PermissionDenied(e) => write!(f, "Permission denied: {e}"),
            AppError::Validation(e) => write!(f, "Validation error: {e}"),
            AppError::Conflict(e) => write!(f, "Conflict: {e}"),
            AppError::NotFound => write!(f, "Not found"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::Internal(e) => write!(f, "Internal error: {e}"),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound().json(json!({"error": "not found"})),
            AppError::Session(msg) => HttpResponse::Unauthorized().json(json!({"error": msg})),
            AppError::PermissionDenied(msg) => {
                HttpResponse::Forbidden().json(json!({"error": format!("permission denied: {msg}")}))
            }
            AppError::Validation(msg) => HttpResponse::BadRequest().json(json!({"error": msg})),
            // Stale-state transitions: the caller re-fetches and retries.
            AppError::Conflict(msg) => HttpResponse::Conflict().json(json!({"error": msg})),
            AppError::Db(_) | AppError::Hash(_) | AppError::Internal(_) => {
                log::error!("{self}");
                HttpResponse::InternalServerError().json(json!({"error": "internal server error"}))
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

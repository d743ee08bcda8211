use actix_session::Session;

use crate::errors::AppError;
use crate::workflow::{Actor, OrgKind, Role};

/// Wrapper around the permission codes granted to the session's user.
#[derive(Debug, Clone, Default)]
pub struct Permissions(pub Vec<String>);

impl Permissions {
    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|p| p == code)
    }

    pub fn from_csv(csv: &str) -> Self {
        let codes = csv
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Permissions(codes)
    }

    pub fn to_csv(&self) -> String {
        self.0.join(",")
    }
}

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_username(session: &Session) -> Result<String, String> {
    match session.get::<String>("username") {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err("No username in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

pub fn get_permissions(session: &Session) -> Result<Permissions, String> {
    match session.get::<String>("permissions") {
        Ok(Some(csv)) => Ok(Permissions::from_csv(&csv)),
        Ok(None) => Err("No permissions in session".to_string()),
        Err(e) => Err(format!("Session error: {}", e)),
    }
}

/// Check permission; returns Err(AppError) if denied.
pub fn require_permission(session: &Session, code: &str) -> Result<(), AppError> {
    let permissions = get_permissions(session)
        .map_err(|e| AppError::Session(format!("Failed to get permissions: {}", e)))?;

    if permissions.has(code) {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(code.to_string()))
    }
}

/// Assemble the caller from the session. Guards take the result as an
/// explicit parameter; nothing downstream reads the session again.
pub fn current_actor(session: &Session) -> Result<Actor, AppError> {
    let user_id =
        get_user_id(session).ok_or_else(|| AppError::Session("Not authenticated".to_string()))?;

    let role_tag = session
        .get::<String>("role")
        .unwrap_or(None)
        .ok_or_else(|| AppError::Session("No role in session".to_string()))?;
    let role = Role::parse(&role_tag)
        .ok_or_else(|| AppError::Session(format!("Unknown role '{role_tag}' in session")))?;

    let kind_tag = session
        .get::<String>("org_kind")
        .unwrap_or(None)
        .ok_or_else(|| AppError::Session("No organization kind in session".to_string()))?;
    let org_kind = OrgKind::parse(&kind_tag)
        .ok_or_else(|| AppError::Session(format!("Unknown organization kind '{kind_tag}'")))?;

    let org_id = session.get::<i64>("org_id").unwrap_or(None);

    let permissions = get_permissions(session).map_err(AppError::Session)?;

    Ok(Actor {
        user_id,
        role,
        org_id,
        org_kind,
        permissions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_round_trip_skips_blanks() {
        let perms = Permissions::from_csv("JOB_VERIFY, ,JOB_PUBLISH,");
        assert!(perms.has("JOB_VERIFY"));
        assert!(perms.has("JOB_PUBLISH"));
        assert!(!perms.has("JOB_ENRICH"));
        assert_eq!(perms.to_csv(), "JOB_VERIFY,JOB_PUBLISH");
    }
}

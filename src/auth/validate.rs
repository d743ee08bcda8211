/// Validate a username: 2-50 chars, alphanumeric and underscore only.
pub fn validate_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Some("Username is required".to_string());
    }
    if trimmed.len() < 2 {
        return Some("Username must be at least 2 characters".to_string());
    }
    if trimmed.len() > 50 {
        return Some("Username must be at most 50 characters".to_string());
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Some("Username may only contain letters, numbers, and underscores".to_string());
    }
    None
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Email must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a password: min 8 chars on create.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate an organization name: 2-100 chars after trimming.
pub fn validate_org_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some("Organization name is required".to_string());
    }
    if trimmed.len() < 2 {
        return Some("Organization name must be at least 2 characters".to_string());
    }
    if trimmed.len() > 100 {
        return Some("Organization name must be at most 100 characters".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("al").is_none());
        assert!(validate_username("a").is_some());
        assert!(validate_username("has space").is_some());
        assert!(validate_username("ok_name_42").is_none());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.co").is_none());
        assert!(validate_email("not-an-email").is_some());
        assert!(validate_email("").is_some());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("12345678").is_none());
        assert!(validate_password("short").is_some());
    }

    #[test]
    fn org_name_rules() {
        assert!(validate_org_name("Acme Staffing").is_none());
        assert!(validate_org_name(" ").is_some());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::DbUser;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 150, message = "user_name must be 1-150 characters"))]
    pub user_name: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "organization must be at most 200 characters"))]
    pub organization: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "password may not be blank"))]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

/// Public projection of a user account.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserRecord {
    pub email: String,
    pub user_name: String,
    pub organization: Option<String>,
    pub start_date: DateTime<Utc>,
    pub is_staff: bool,
    pub is_active: bool,
}

impl From<DbUser> for UserRecord {
    fn from(u: DbUser) -> Self {
        Self {
            email: u.email,
            user_name: u.user_name,
            organization: u.organization,
            start_date: u.start_date,
            is_staff: u.is_staff,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserRecord,
}

/// Admin-editable flags; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// Lowercase the domain part, as account managers conventionally do.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_keeps_local_part_case() {
        assert_eq!(normalize_email(" John.Doe@Example.ORG "), "John.Doe@example.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn register_request_validation() {
        let ok = RegisterRequest {
            email: "a@b.org".to_string(),
            user_name: "a".to_string(),
            organization: None,
            password: "pw".to_string(),
            password2: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = RegisterRequest {
            email: "not-an-email".to_string(),
            user_name: "x".repeat(151),
            ..ok
        };
        let errs = bad.validate().unwrap_err();
        let fields = errs.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("user_name"));
    }
}

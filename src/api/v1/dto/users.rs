/*
 * Responsibility
 * - Users の request/response DTO
 * - password はここでしか受けない (response には一切出さない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::repos::user_repo::UserRow;

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "at least one role is required"))]
    pub roles: Vec<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "password_confirm does not match password"))]
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub date_created: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id,
            name: row.name,
            email: row.email,
            roles: row.roles,
            date_created: row.date_created,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NewUser {
        NewUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            roles: vec!["USER".to_string()],
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        }
    }

    #[test]
    fn valid_user_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn mismatched_password_confirm_fails() {
        let mut user = base();
        user.password_confirm = "something else".to_string();

        let errors = user.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));
    }

    #[test]
    fn empty_role_set_fails() {
        let mut user = base();
        user.roles.clear();
        assert!(user.validate().is_err());
    }
}

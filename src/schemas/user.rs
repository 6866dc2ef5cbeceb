use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::format_timestamp;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "lastName")]
    pub last_name: String,
    #[serde(default)]
    #[serde(alias = "birthDate")]
    pub birth_date: Option<Date>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(default)]
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(default)]
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub password: Option<String>,
}

/// What callers see; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<String>,
    pub role: UserRole,
    pub created_at: String,
}

impl UserView {
    pub fn from_record(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date.map(|date| date.to_string()),
            role: user.role,
            created_at: format_timestamp(user.created_at),
        }
    }
}

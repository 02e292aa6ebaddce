use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// Landing page after login
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Employee => "/employee/dashboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: Option<NaiveDateTime>,
}

fn default_active() -> bool {
    true
}

/// Body for creating or updating a user. Password is only mandatory on create.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub full_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl UserInput {
    pub fn validate_for_create(&self) -> AppResult<()> {
        if self.password.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        self.validate()
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }
        if self.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            if !looks_like_email(email) {
                return Err(AppError::Validation("Invalid email format".to_string()));
            }
        }
        Ok(())
    }
}

/// Loose shape check; the backend does the real validation.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

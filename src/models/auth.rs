use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::Role;
use crate::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// `/auth/login` and `/auth/refresh` payload from the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: Option<String>,
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

/// Only the access token is guaranteed on refresh; a rotated refresh token is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// What the browser gets back after a successful login.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub redirect: String,
}

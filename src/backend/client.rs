use metrics::counter;
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::BTreeMap;
use std::time::Duration;

use super::request::{BackendRequest, RequestBody};
use crate::models::{AuthResponse, LoginInput, RefreshRequest, RefreshResponse};
use crate::{AppError, AppResult};

/// HTTP client for the generator-maintenance REST API.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one attempt of `request`. Status handling is left to the caller.
    pub async fn dispatch(
        &self,
        request: &BackendRequest,
        access_token: Option<&str>,
    ) -> AppResult<reqwest::Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));

        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes.clone()),
            RequestBody::Text(text) => builder
                .header(header::CONTENT_TYPE, "text/plain")
                .body(text.clone()),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, path = %request.path, "Backend request failed");
            e
        })?;

        counter!(
            "backend_requests_total",
            "method" => request.method.to_string(),
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);

        Ok(response)
    }

    pub async fn login(&self, input: &LoginInput) -> AppResult<AuthResponse> {
        let request = BackendRequest::post("/auth/login").json(input)?;
        let response = self.dispatch(&request, None).await?;
        let outcome = if response.status().is_success() { "success" } else { "failure" };
        counter!("portal_logins_total", "outcome" => outcome).increment(1);
        read_json(ensure_success(response).await?).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let request = BackendRequest::post("/auth/refresh").json(&RefreshRequest { refresh_token })?;
        let response = self.dispatch(&request, None).await?;
        let outcome = if response.status().is_success() { "success" } else { "failure" };
        counter!("portal_token_refreshes_total", "outcome" => outcome).increment(1);
        read_json(ensure_success(response).await?).await
    }

    pub async fn logout(&self, access_token: &str, user_id: i64) -> AppResult<()> {
        let request = BackendRequest::post("/auth/logout").query_opt("userId", Some(user_id));
        let response = self.dispatch(&request, Some(access_token)).await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Error payloads the backend produces: `{message}`, `{error}` or `{errors: {field: msg}}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
    errors: Option<BTreeMap<String, String>>,
}

pub fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

    if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
        return errors
            .into_iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect::<Vec<_>>()
            .join("; ");
    }

    parsed
        .message
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Backend request failed")
                .to_string()
        })
}

/// Turn a non-2xx response into `AppError::Backend` carrying the backend's status and message.
pub async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::warn!(status = %status, message, "Backend rejected request");

    Err(AppError::Backend { status, message })
}

pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    response.json::<T>().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to decode backend response");
        AppError::Internal(format!("Unexpected backend response: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"message":"Day already started"}"#);
        assert_eq!(msg, "Day already started");
    }

    #[test]
    fn test_field_errors_joined() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"errors":{"username":"must not be blank","email":"invalid"}}"#,
        );
        assert_eq!(msg, "email: invalid; username: must not be blank");
    }

    #[test]
    fn test_unparseable_body_falls_back_to_reason() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
        assert_eq!(error_message(StatusCode::CONFLICT, r#"{"message":"  "}"#), "Conflict");
    }

    #[test]
    fn test_url_join() {
        let client = BackendClient::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url("/admin/users"), "http://localhost:8080/api/admin/users");
    }
}

use reqwest::Method;
use serde::Serialize;

use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Vec<u8>),
    Text(String),
}

/// A backend call described independently of any token, so it can be
/// replayed after a refresh.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    /// Adds a single parameter when a value is present.
    pub fn query_opt(mut self, name: &str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> AppResult<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| AppError::Internal(format!("Failed to encode request body: {}", e)))?;
        self.body = RequestBody::Json(bytes);
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }
}

//! In-process stand-in for the generator-maintenance API, plus helpers for
//! driving the portal router in tests.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;

use crate::{AppConfig, AppState, MetricsState};

pub const TEST_SECRET: &str = "test-session-secret-0123456789abcdef";
pub const PASSWORD: &str = "secret";

pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub refresh_succeeds: AtomicBool,
    /// When set, the refreshed token is rejected as well.
    pub reject_refreshed_token: AtomicBool,
    pub valid_token: Mutex<String>,
    /// "METHOD /path" of every authenticated call, in arrival order.
    pub requests: Mutex<Vec<String>>,
    pub bodies: Mutex<Vec<Value>>,
    pub day: Mutex<Value>,
    pub card_status: Mutex<String>,
}

impl MockState {
    fn new() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            refresh_succeeds: AtomicBool::new(true),
            reject_refreshed_token: AtomicBool::new(false),
            valid_token: Mutex::new("a1".to_string()),
            requests: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            day: Mutex::new(json!({"dayStarted": true, "dayEnded": false})),
            card_status: Mutex::new("PENDING".to_string()),
        }
    }
}

pub struct MockBackend {
    pub state: Arc<MockState>,
    pub base_url: String,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::new());
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            state,
            base_url: format!("http://{}/api", addr),
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == call).count()
    }

    /// Invalidate the current access token, as if it had expired.
    pub fn expire_access_token(&self) {
        *self.state.valid_token.lock() = "a2".to_string();
    }

    pub fn set_day(&self, started: bool, ended: bool) {
        *self.state.day.lock() = json!({"dayStarted": started, "dayEnded": ended});
    }

    pub fn set_card_status(&self, status: &str) {
        *self.state.card_status.lock() = status.to_string();
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.bodies.lock().last().cloned()
    }
}

fn job_card(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "mainTicketId": 10,
        "ticketNumber": "TKT-20240501-0001",
        "ticketTitle": "Quarterly service",
        "status": status,
        "workMinutes": 75,
        "approved": false
    })
}

fn time_tracking_report() -> Value {
    json!({
        "employeeId": 5,
        "employeeName": "Kamal Perera",
        "startDate": "2024-05-01",
        "endDate": "2024-05-03",
        "dailyRecords": [
            {"date": "2024-05-01", "totalWorkMinutes": 480, "morningOtMinutes": 30, "eveningOtMinutes": 45, "dayStarted": true, "dayEnded": true},
            {"date": "2024-05-02", "totalWorkMinutes": 500, "morningOtMinutes": 0, "eveningOtMinutes": 20, "dayStarted": true, "dayEnded": true},
            {"date": "2024-05-03", "totalWorkMinutes": 0, "morningOtMinutes": 0, "eveningOtMinutes": 0, "dayStarted": false, "dayEnded": false}
        ],
        "totalWorkMinutes": 980,
        "totalMorningOtMinutes": 30,
        "totalEveningOtMinutes": 65,
        "totalOtMinutes": 95
    })
}

fn page(content: Vec<Value>, total: u64) -> Value {
    json!({
        "content": content,
        "number": 0,
        "size": 10,
        "totalElements": total,
        "totalPages": 1,
        "first": true,
        "last": true
    })
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": message}))).into_response()
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api").to_string();
    let json_body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    match (method.as_str(), path.as_str()) {
        ("POST", "/auth/login") => {
            if json_body["password"] != PASSWORD {
                return unauthorized("Invalid username or password");
            }
            let username = json_body["username"].as_str().unwrap_or_default().to_string();
            let (role, user_id, full_name) = if username == "admin" {
                ("ADMIN", 1, "Admin User")
            } else {
                ("EMPLOYEE", 5, "Kamal Perera")
            };
            return Json(json!({
                "accessToken": "a1",
                "refreshToken": "r1",
                "tokenType": "Bearer",
                "userId": user_id,
                "username": username,
                "fullName": full_name,
                "role": role
            }))
            .into_response();
        }
        ("POST", "/auth/refresh") => {
            state.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if !state.refresh_succeeds.load(Ordering::SeqCst) {
                return unauthorized("Invalid refresh token");
            }
            let accepted = if state.reject_refreshed_token.load(Ordering::SeqCst) { "never" } else { "a2" };
            *state.valid_token.lock() = accepted.to_string();
            return Json(json!({"accessToken": "a2", "refreshToken": "r2"})).into_response();
        }
        _ => {}
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    if bearer != *state.valid_token.lock() {
        return unauthorized("Token expired");
    }

    state.requests.lock().push(format!("{} {}", method, path));
    if !json_body.is_null() {
        state.bodies.lock().push(json_body.clone());
    } else if !body.is_empty() {
        state
            .bodies
            .lock()
            .push(Value::String(String::from_utf8_lossy(&body).into_owned()));
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "logout"]) => StatusCode::OK.into_response(),
        ("GET", ["employee", "day", "status"]) => Json(state.day.lock().clone()).into_response(),
        ("GET", ["employee", "job-cards"]) => {
            let status = state.card_status.lock().clone();
            Json(page(vec![job_card(7, &status)], 1)).into_response()
        }
        ("GET", ["employee", "job-cards", id]) => {
            let status = state.card_status.lock().clone();
            Json(job_card(id.parse().unwrap_or(0), &status)).into_response()
        }
        ("POST", ["employee", "job-cards", id, "status"]) => {
            let status = json_body["newStatus"].as_str().unwrap_or("PENDING").to_string();
            *state.card_status.lock() = status.clone();
            Json(job_card(id.parse().unwrap_or(0), &status)).into_response()
        }
        ("POST", ["employee", "job-cards", id, "image"]) => {
            let mut card = job_card(id.parse().unwrap_or(0), &state.card_status.lock().clone());
            card["image"] = json_body["imageData"].clone();
            Json(card).into_response()
        }
        ("GET", ["admin", "reports", "time-tracking"]) => Json(time_tracking_report()).into_response(),
        ("GET", ["admin", "users"]) => Json(page(
            vec![json!({"id": 5, "username": "kamal", "fullName": "Kamal Perera", "role": "EMPLOYEE"})],
            1,
        ))
        .into_response(),
        ("POST", ["admin", "tickets"]) => (
            StatusCode::CREATED,
            Json(json!({
                "id": 3,
                "ticketNumber": "TKT-20240601-0003",
                "title": json_body["title"],
                "weight": json_body["weight"],
                "status": "ASSIGNED"
            })),
        )
            .into_response(),
        ("POST", ["employee", "day", "start"]) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Day already started"})),
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response(),
    }
}

pub fn test_config(base_url: &str) -> AppConfig {
    let base_url = base_url.to_string();
    AppConfig::from_lookup(|key| match key {
        "SESSION_SECRET" => Some(TEST_SECRET.to_string()),
        "API_BASE_URL" => Some(base_url.clone()),
        "BACKEND_TIMEOUT_SECS" => Some("5".to_string()),
        "MAX_IMAGE_BYTES" => Some("1024".to_string()),
        "DEBUG_KEY" => Some("debug-key".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn test_state(base_url: &str) -> Arc<AppState> {
    Arc::new(AppState::new(test_config(base_url), Arc::new(MetricsState::detached())).unwrap())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn json_request(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Log in through the portal and return the `Cookie` header value for the session.
pub async fn login(app: &Router, username: &str) -> String {
    let response = send(
        app,
        json_request(
            Method::POST,
            "/login",
            None,
            json!({"username": username, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

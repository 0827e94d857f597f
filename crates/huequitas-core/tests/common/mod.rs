//! In-process fake of the HueQuitas HTTP API.
//!
//! Every request is recorded (method, path, query, Authorization header, body)
//! so tests can assert on what actually went over the wire.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use huequitas_core::api::{Api, HttpApi};
use huequitas_core::credentials::{CredentialStore, MemoryCredentialStore};
use huequitas_core::HueClient;

pub const GOOD_PASSWORD: &str = "correcto123";
/// Accepted by the fake login, which then answers with `token: ""`.
pub const BLANK_TOKEN_PASSWORD: &str = "sin-token-123";
pub const TOKEN: &str = "jwt-abc";
pub const LOGIN_REJECTION: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Default)]
struct FakeState {
    requests: Vec<Recorded>,
    likes: HashSet<String>,
}

type Shared = Arc<Mutex<FakeState>>;

pub struct FakeBackend {
    pub base_url: String,
    state: Shared,
}

impl FakeBackend {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve fake backend");
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Client over the real HTTP backend, sharing `store` for the bearer token.
    pub fn client(&self, store: Arc<MemoryCredentialStore>) -> HueClient {
        let credentials: Arc<dyn CredentialStore> = store;
        let api = HttpApi::new(&self.base_url, credentials.clone()).expect("http api");
        HueClient::new(Api::Http(api), credentials)
    }
}

fn ok(value: Value) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn restaurant(id: &str) -> Value {
    json!({
        "_id": id,
        "name": format!("Restaurante {id}"),
        "description": "Sopas de la casa",
        "address": "Calle 1 #2-3",
        "cuisine": "Soups",
        "rating": 4.5,
        "totalRatings": 10,
        "image": null
    })
}

fn user() -> Value {
    json!({ "_id": "u1", "name": "Ana Ruiz", "email": "ana@example.com" })
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    let recorded = Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: body.clone(),
    };
    state.lock().unwrap().requests.push(recorded);

    let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            if payload["password"] == GOOD_PASSWORD {
                ok(json!({ "message": "Login successful", "token": TOKEN, "user": user() }))
            } else if payload["password"] == BLANK_TOKEN_PASSWORD {
                ok(json!({ "message": "Login successful", "token": "", "user": user() }))
            } else {
                fail(StatusCode::UNAUTHORIZED, LOGIN_REJECTION)
            }
        }
        ("POST", ["auth", "register"]) => ok(json!({
            "token": TOKEN,
            "user": { "_id": "u2", "name": payload["name"], "email": payload["email"] }
        })),
        ("POST", ["auth", "password-reset-request"]) => {
            ok(json!({ "resetToken": "rt-1", "message": "Reset token generated" }))
        }
        ("POST", ["auth", "password-reset"]) => {
            if payload["resetToken"] == "rt-1" {
                ok(json!({ "message": "Password updated" }))
            } else {
                fail(StatusCode::BAD_REQUEST, "Invalid or expired reset token")
            }
        }
        ("GET", ["api", "restaurants"]) => ok(json!([
            restaurant("r1"),
            { "_id": "r2", "name": "Dulces de la Abuela", "cuisine": "Desserts", "rating": 4.9 },
            { "_id": "r3", "name": "Bandeja Paisa Express", "cuisine": "Main" }
        ])),
        ("POST", ["api", "restaurants"]) => {
            let mut created = restaurant("r9");
            created["name"] = payload["name"].clone();
            ok(created)
        }
        ("GET", ["api", "restaurants", "broken"]) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"_id\": 42"))
            .unwrap(),
        ("GET", ["api", "restaurants", "down"]) => Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .header(header::CONTENT_TYPE, "text/html")
            .body(Body::from("<html><body>Bad Gateway</body></html>"))
            .unwrap(),
        ("GET", ["api", "restaurants", id]) => ok(restaurant(id)),
        ("DELETE", ["api", "restaurants", _]) => StatusCode::NO_CONTENT.into_response(),
        ("POST", ["api", "reviews"]) => ok(json!({
            "_id": "rev1",
            "restaurantId": payload["restaurantId"],
            "userId": "u1",
            "userName": "Ana Ruiz",
            "rating": payload["rating"],
            "comment": payload["comment"],
            "image": payload.get("image").cloned().unwrap_or(Value::Null),
            "createdAt": "2024-05-01T12:00:00Z"
        })),
        ("PUT", ["api", "reviews", id]) => ok(json!({
            "_id": id,
            "restaurantId": "r1",
            "userId": "u1",
            "rating": payload["rating"],
            "comment": payload["comment"],
            "image": payload["image"],
            "createdAt": "2024-05-01T12:00:00Z"
        })),
        ("GET", ["api", "reviews", id]) => ok(json!([{
            "_id": "rev1",
            "restaurantId": id,
            "userId": "u1",
            "userName": "Ana Ruiz",
            "rating": 5,
            "comment": "Delicioso",
            "createdAt": "2024-05-01T12:00:00Z"
        }])),
        ("POST", ["api", "like"]) => {
            let id = payload["restaurantId"].as_str().unwrap_or_default().to_string();
            let mut guard = state.lock().unwrap();
            let liked = if guard.likes.remove(&id) {
                false
            } else {
                guard.likes.insert(id);
                true
            };
            ok(json!({ "liked": liked }))
        }
        ("GET", ["api", "likes", id]) if id.starts_with("nolikes") => {
            fail(StatusCode::INTERNAL_SERVER_ERROR, "likes store offline")
        }
        ("GET", ["api", "likes", id]) => {
            let liked = state.lock().unwrap().likes.contains(*id);
            ok(json!({ "liked": liked }))
        }
        ("GET", ["chat", "messages"]) => ok(json!([
            { "_id": "m2", "userId": "u2", "userName": "María", "message": "segundo", "timestamp": "2024-05-01T12:05:00Z" },
            { "_id": "m1", "userId": "u1", "userName": "Carlos", "message": "primero", "timestamp": "2024-05-01T12:00:00Z" }
        ])),
        _ => fail(StatusCode::NOT_FOUND, "Not found"),
    }
}

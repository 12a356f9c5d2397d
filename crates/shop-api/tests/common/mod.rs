//! Shared helpers for router tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shop_api::server::{create_auth_app, create_user_app};
use shop_api::{AuthState, UserState};
use shop_common::{
    InternalTrustGate, JwtService, PasswordService, INTERNAL_TOKEN_HEADER, USER_EMAIL_HEADER,
    USER_ID_HEADER, USER_ROLE_HEADER,
};
use shop_core::{UserId, UserRepository, UserRole};
use shop_db::{MemoryRefreshTokenRepository, MemoryUserRepository};
use shop_service::{AuthContextBuilder, RepositoryUserDirectory, UserContextBuilder};
use tower::ServiceExt;

pub const INTERNAL_TOKEN: &str = "internal-test-token";
pub const JWT_SECRET: &str = "router-test-secret";
pub const PASSWORD: &str = "Password123";

/// Both services wired over one in-memory user store
pub struct Services {
    pub auth: Router,
    pub users: Router,
    pub user_repo: Arc<MemoryUserRepository>,
}

pub fn services() -> Services {
    let user_repo = Arc::new(MemoryUserRepository::new());
    let gate = InternalTrustGate::new(INTERNAL_TOKEN);

    let auth_ctx = AuthContextBuilder::new()
        .refresh_repo(Arc::new(MemoryRefreshTokenRepository::new()))
        .directory(Arc::new(RepositoryUserDirectory::new(user_repo.clone())))
        .jwt_service(Arc::new(JwtService::new(JWT_SECRET, 900)))
        .build()
        .unwrap();

    let user_ctx = UserContextBuilder::new()
        .user_repo(user_repo.clone())
        .password_service(PasswordService::with_cost(1024, 1, 1))
        .build()
        .unwrap();

    Services {
        auth: create_auth_app(AuthState::new(auth_ctx, gate.clone())),
        users: create_user_app(UserState::new(user_ctx, gate)),
        user_repo,
    }
}

pub struct TestRequest {
    method: Method,
    uri: String,
    body: Option<String>,
    headers: Vec<(String, String)>,
}

impl TestRequest {
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn raw_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn internal(self) -> Self {
        self.header(INTERNAL_TOKEN_HEADER, INTERNAL_TOKEN)
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {token}"))
    }

    /// Identity headers as the gateway would inject them
    pub fn identity(self, user: &Value) -> Self {
        self.header(USER_ID_HEADER, str_field(user, "id"))
            .header(USER_EMAIL_HEADER, str_field(user, "email"))
            .header(USER_ROLE_HEADER, str_field(user, "role"))
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        match self.body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}

/// Send a request and return status plus parsed body
pub async fn send(app: &Router, request: TestRequest) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request.build()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn str_field(value: &Value, field: &str) -> String {
    value[field].as_str().unwrap_or_default().to_string()
}

pub fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

/// Register a user and return the `data` of the response
pub async fn register(services: &Services, email: &str) -> Value {
    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/register").json(json!({
            "email": email,
            "password": PASSWORD,
            "fullName": "Test User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

/// Issue a token pair for a registered user as the gateway would
pub async fn issue_tokens(services: &Services, user: &Value) -> Value {
    let (status, body) = send(
        &services.auth,
        TestRequest::post("/v1/auth/create-tokens")
            .internal()
            .json(json!({
                "id": user["id"],
                "email": user["email"],
                "role": user["role"],
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

/// Grant the admin role directly in the store
pub async fn promote_to_admin(services: &Services, user: &Value) -> Value {
    let id = UserId::parse(&str_field(user, "id")).unwrap();
    let mut stored = services.user_repo.find_by_id(id).await.unwrap().unwrap();
    stored.role = UserRole::Admin;
    services.user_repo.update(&stored).await.unwrap();

    let mut promoted = user.clone();
    promoted["role"] = json!("admin");
    promoted
}

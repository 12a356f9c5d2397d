//! Test helpers for integration tests
//!
//! Starts the three services on ephemeral ports, wired to each other the way
//! they are deployed: the gateway in front, the auth-service resolving users
//! through the user-service's internal route.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shop_api::server::{create_auth_app, create_auth_state, create_user_app, create_user_state};
use shop_common::{AuthServiceConfig, DatabaseConfig, Envelope, GatewayConfig, UserServiceConfig};
use shop_core::{UserId, UserRepository, UserRole};
use shop_db::{create_pool, PgUserRepository};
use shop_gateway::{create_app_with_config, GatewayState};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const INTERNAL_TOKEN: &str = "integration-test-internal";

/// One spawned service
pub struct TestServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(app: Router) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Gateway, auth-service and user-service sharing one database
pub struct TestStack {
    pub gateway: TestServer,
    pub auth: TestServer,
    pub users: TestServer,
    pub client: Client,
    database: DatabaseConfig,
}

impl TestStack {
    pub async fn start() -> Result<Self> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL")?;

        let mut vars: HashMap<&'static str, String> = HashMap::from([
            ("DATABASE_URL", database_url),
            ("DATABASE_MAX_CONNECTIONS", "5".to_string()),
            ("DATABASE_MIN_CONNECTIONS", "1".to_string()),
            ("JWT_SECRET", JWT_SECRET.to_string()),
            ("INTERNAL_SERVICE_TOKEN", INTERNAL_TOKEN.to_string()),
            ("USER_SERVICE_PORT", "0".to_string()),
            ("AUTH_SERVICE_PORT", "0".to_string()),
            ("GATEWAY_PORT", "0".to_string()),
            ("UPSTREAM_TIMEOUT", "5".to_string()),
            ("RATE_LIMIT_REQUESTS_PER_SECOND", "1000".to_string()),
            ("RATE_LIMIT_BURST", "1000".to_string()),
        ]);

        let user_config = UserServiceConfig::from_lookup(lookup(&vars))?;
        let users = TestServer::start(create_user_app(create_user_state(&user_config).await?)).await?;
        vars.insert("USER_SERVICE_URL", users.base_url());

        let auth_config = AuthServiceConfig::from_lookup(lookup(&vars))?;
        let auth = TestServer::start(create_auth_app(create_auth_state(&auth_config).await?)).await?;
        vars.insert("AUTH_SERVICE_URL", auth.base_url());

        let gateway_config = GatewayConfig::from_lookup(lookup(&vars))?;
        let app = create_app_with_config(GatewayState::from_config(&gateway_config)?, &gateway_config)?;
        let gateway = TestServer::start(app).await?;

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            gateway,
            auth,
            users,
            client,
            database: user_config.database,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.gateway.base_url(), path)
    }

    /// Make a GET request through the gateway
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a GET request with auth token
    pub async fn get_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request with auth token
    pub async fn post_auth<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a DELETE request with auth token
    pub async fn delete_auth(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Grant the admin role straight in the database
    pub async fn promote_to_admin(&self, user_id: &str) -> Result<()> {
        let pool = create_pool(&self.database).await?;
        let repo = PgUserRepository::new(pool);
        let id = UserId::parse(user_id)?;

        let mut user = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user {user_id} not found"))?;
        user.role = UserRole::Admin;
        repo.update(&user).await?;
        Ok(())
    }
}

fn lookup<'a>(vars: &'a HashMap<&'static str, String>) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| vars.get(key).cloned()
}

/// Helper to check if test environment is available
pub async fn check_test_env() -> bool {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }
    true
}

/// Assert response status and unwrap the envelope's `data`
pub async fn assert_data<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }

    let envelope: Envelope<T> = serde_json::from_str(&body)?;
    envelope
        .data
        .ok_or_else(|| anyhow::anyhow!("Response without data: {body}"))
}

/// Assert an error status and return the envelope's message and code
pub async fn assert_error(
    response: Response,
    expected_status: StatusCode,
) -> Result<(String, String)> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }

    let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
    let code = envelope.error.map(|e| e.code).unwrap_or_default();
    Ok((envelope.message, code))
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}

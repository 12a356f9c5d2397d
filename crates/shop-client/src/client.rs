//! HTTP client for the gateway's public API

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shop_common::Envelope;
use shop_service::dto::{
    ChangePasswordRequest, LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest,
    RevokeAllResponse, SessionResponse, TokenPairResponse, UpdateProfileRequest, UserResponse,
};
use tracing::warn;

use crate::error::{ClientError, ClientResult};
use crate::session::{SessionManager, TokenPair, TokenRefresher};

/// Shared transport: base URL plus envelope decoding
#[derive(Clone)]
struct Transport {
    http: Client,
    base_url: Arc<str>,
}

impl Transport {
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
    }

    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status().as_u16();
    let envelope: Envelope<T> = response
        .json()
        .await
        .map_err(|e| ClientError::Decode(format!("status {status}: {e}")))?;

    match (envelope.success, envelope.data) {
        (true, Some(data)) => Ok(data),
        (true, None) => Err(ClientError::Decode(format!(
            "status {status}: success without data"
        ))),
        (false, _) => Err(ClientError::Api {
            status,
            code: envelope
                .error
                .map_or_else(|| "UNKNOWN_ERROR".to_string(), |e| e.code),
            message: envelope.message,
        }),
    }
}

/// Refreshes through `POST /v1/auth/refresh-token`
struct HttpRefresher {
    transport: Transport,
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenPair> {
        let pair: TokenPairResponse = self
            .transport
            .call(
                self.transport
                    .request(Method::POST, "/v1/auth/refresh-token")
                    .json(&RefreshTokenRequest {
                        refresh_token: refresh_token.to_string(),
                    }),
            )
            .await?;
        Ok(pair.into())
    }
}

/// Storefront client
///
/// Keeps the token pair of the signed-in user and attaches the bearer to
/// protected calls. A 401 triggers one shared refresh and a single replay;
/// `ClientError::SessionExpired` means the user has to sign in again.
#[derive(Clone)]
pub struct StorefrontClient {
    transport: Transport,
    session: Arc<SessionManager>,
}

impl StorefrontClient {
    /// Client for the gateway at `base_url`
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let transport = Transport {
            http,
            base_url: base_url.trim_end_matches('/').into(),
        };
        let refresher = Arc::new(HttpRefresher {
            transport: transport.clone(),
        });

        Ok(Self {
            transport,
            session: Arc::new(SessionManager::new(refresher)),
        })
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<UserResponse> {
        self.transport
            .call(
                self.transport
                    .request(Method::POST, "/v1/users/register")
                    .json(request),
            )
            .await
    }

    /// Sign in and keep the returned token pair
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionResponse> {
        let session: SessionResponse = self
            .transport
            .call(
                self.transport
                    .request(Method::POST, "/v1/users/login")
                    .json(&LoginRequest {
                        email: email.to_string(),
                        password: password.to_string(),
                    }),
            )
            .await?;

        self.session.store(TokenPair::from(&session));
        Ok(session)
    }

    /// Sign out; local tokens are dropped even when the call fails
    pub async fn logout(&self) -> ClientResult<()> {
        let Some(tokens) = self.session.tokens() else {
            return Ok(());
        };
        let body = LogoutRequest {
            refresh_token: Some(tokens.refresh_token),
        };

        let result = self
            .transport
            .call::<Value>(
                self.transport
                    .request(Method::POST, "/v1/users/logout")
                    .bearer_auth(&tokens.access_token)
                    .json(&body),
            )
            .await;

        self.session.clear();
        if let Err(e) = &result {
            warn!(error = %e, "Logout call failed, local session cleared anyway");
        }
        result.map(|_| ())
    }

    pub async fn profile(&self) -> ClientResult<UserResponse> {
        self.authorized(Method::GET, "/v1/users/profile", None::<&()>)
            .await
    }

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<UserResponse> {
        self.authorized(Method::PATCH, "/v1/users/profile", Some(request))
            .await
    }

    pub async fn change_password(&self, request: &ChangePasswordRequest) -> ClientResult<()> {
        self.authorized::<Value, _>(Method::POST, "/v1/users/change-password", Some(request))
            .await
            .map(|_| ())
    }

    /// Sign out everywhere; returns the number of revoked sessions
    pub async fn revoke_all(&self) -> ClientResult<u64> {
        let revoked: RevokeAllResponse = self
            .authorized(Method::POST, "/v1/auth/revoke-all", None::<&()>)
            .await?;
        self.session.clear();
        Ok(revoked.revoked_count)
    }

    /// Bearer call through the session manager
    pub async fn authorized<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        self.session
            .send_authorized(|access| {
                let mut request = self
                    .transport
                    .request(method.clone(), path)
                    .bearer_auth(access);
                if let Some(body) = body {
                    request = request.json(body);
                }
                self.transport.call(request)
            })
            .await
    }
}

impl std::fmt::Debug for StorefrontClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontClient")
            .field("base_url", &self.transport.base_url)
            .field("session", &self.session)
            .finish()
    }
}

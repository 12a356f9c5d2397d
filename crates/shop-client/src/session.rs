//! Token storage and single-flight refresh
//!
//! Concurrent requests that all hit a 401 share one refresh call: the first
//! caller takes the refresh lock and rotates the pair, the others wait on the
//! lock and then find the access token already replaced. Each request is
//! replayed at most once.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use shop_service::dto::{SessionResponse, TokenPairResponse};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// Stored access/refresh token pair
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPairResponse> for TokenPair {
    fn from(pair: TokenPairResponse) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

impl From<&SessionResponse> for TokenPair {
    fn from(session: &SessionResponse) -> Self {
        Self {
            access_token: session.tokens.access_token.clone(),
            refresh_token: session.tokens.refresh_token.clone(),
        }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Exchanges a refresh token for a new pair
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenPair>;
}

pub struct SessionManager {
    tokens: RwLock<Option<TokenPair>>,
    refresh_lock: Mutex<()>,
    refresher: Arc<dyn TokenRefresher>,
}

impl SessionManager {
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresher,
        }
    }

    pub fn store(&self, pair: TokenPair) {
        *self.tokens.write() = Some(pair);
    }

    pub fn clear(&self) {
        *self.tokens.write() = None;
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.read().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens.read().as_ref().map(|t| t.access_token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.tokens.read().is_some()
    }

    /// Run `send` with the current access token, refreshing once on 401
    ///
    /// # Errors
    /// `NotSignedIn` without tokens, `SessionExpired` when the refresh or the
    /// replay is refused, otherwise whatever `send` returns
    pub async fn send_authorized<F, Fut, T>(&self, send: F) -> ClientResult<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let access = self.access_token().ok_or(ClientError::NotSignedIn)?;

        match send(access.clone()).await {
            Err(e) if e.is_unauthorized() => {
                let fresh = self.refresh_after_unauthorized(&access).await?;
                match send(fresh).await {
                    Err(e) if e.is_unauthorized() => {
                        warn!("Request refused again after refresh");
                        self.clear();
                        Err(ClientError::SessionExpired)
                    }
                    other => other,
                }
            }
            other => other,
        }
    }

    /// Refresh unless another caller already replaced `stale_access`
    ///
    /// # Errors
    /// `SessionExpired` when the refresh token is refused or tokens were
    /// cleared meanwhile; transport failures are passed through and keep the tokens
    pub async fn refresh_after_unauthorized(&self, stale_access: &str) -> ClientResult<String> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.tokens().ok_or(ClientError::SessionExpired)?;
        if current.access_token != stale_access {
            debug!("Token already refreshed by a concurrent request");
            return Ok(current.access_token);
        }

        match self.refresher.refresh(&current.refresh_token).await {
            Ok(pair) => {
                info!("Session refreshed");
                let access = pair.access_token.clone();
                self.store(pair);
                Ok(access)
            }
            Err(e) if e.is_rejection() => {
                warn!(error = %e, "Refresh refused, clearing session");
                self.clear();
                Err(ClientError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}

//! Gateway state
//!
//! Outbound clients for each backend, the access-token validator and the
//! internal secret used for composed calls.

use std::sync::Arc;

use axum::extract::FromRef;
use shop_common::{AppError, GatewayConfig, ServiceClient, SessionValidator};

use crate::policy::Upstream;

/// Gateway application state
#[derive(Clone)]
pub struct GatewayState {
    validator: SessionValidator,
    users: ServiceClient,
    auth: ServiceClient,
    products: Option<ServiceClient>,
    internal_token: Arc<str>,
}

impl GatewayState {
    pub fn new(
        validator: SessionValidator,
        users: ServiceClient,
        auth: ServiceClient,
        products: Option<ServiceClient>,
        internal_token: &str,
    ) -> Self {
        Self {
            validator,
            users,
            auth,
            products,
            internal_token: internal_token.into(),
        }
    }

    /// Build clients for every configured upstream
    ///
    /// # Errors
    /// Returns an error if an HTTP client cannot be built
    pub fn from_config(config: &GatewayConfig) -> Result<Self, AppError> {
        let upstream = &config.upstream;
        let timeout = upstream.timeout();

        let users = ServiceClient::new(Upstream::Users.name(), &upstream.user_service_url, timeout)?;
        let auth = ServiceClient::new(Upstream::Auth.name(), &upstream.auth_service_url, timeout)?;
        let products = upstream
            .product_service_url
            .as_deref()
            .map(|url| ServiceClient::new(Upstream::Products.name(), url, timeout))
            .transpose()?;

        Ok(Self::new(
            SessionValidator::new(&config.jwt_secret),
            users,
            auth,
            products,
            &config.internal.token,
        ))
    }

    pub fn validator(&self) -> &SessionValidator {
        &self.validator
    }

    pub fn users(&self) -> &ServiceClient {
        &self.users
    }

    pub fn auth(&self) -> &ServiceClient {
        &self.auth
    }

    /// Client for `upstream`; products are optional
    pub fn client(&self, upstream: Upstream) -> Option<&ServiceClient> {
        match upstream {
            Upstream::Auth => Some(&self.auth),
            Upstream::Users => Some(&self.users),
            Upstream::Products => self.products.as_ref(),
        }
    }

    pub fn internal_token(&self) -> &str {
        &self.internal_token
    }
}

impl FromRef<GatewayState> for SessionValidator {
    fn from_ref(state: &GatewayState) -> Self {
        state.validator.clone()
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("users", &self.users)
            .field("auth", &self.auth)
            .field("products", &self.products)
            .finish_non_exhaustive()
    }
}

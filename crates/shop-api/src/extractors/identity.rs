//! Gateway identity extractors
//!
//! Backends trust the `x-user-*` headers injected by the gateway after it
//! verified the bearer token. The headers carry no signature; backends must
//! only be reachable through the gateway.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shop_common::{AppError, GatewayIdentity, USER_EMAIL_HEADER, USER_ID_HEADER, USER_ROLE_HEADER};
use shop_core::UserId;

use crate::response::ApiError;

/// Caller identified by gateway-injected headers
#[derive(Debug, Clone)]
pub struct IdentityUser(pub GatewayIdentity);

impl IdentityUser {
    pub fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IdentityUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = GatewayIdentity::from_header_values(
            header(parts, USER_ID_HEADER),
            header(parts, USER_EMAIL_HEADER),
            header(parts, USER_ROLE_HEADER),
        )?;

        Ok(IdentityUser(identity))
    }
}

/// Header value as UTF-8. `to_str` would refuse non-ASCII email addresses.
fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
}

/// Identity whose role is `admin`
#[derive(Debug, Clone)]
pub struct AdminUser(pub GatewayIdentity);

impl AdminUser {
    pub fn user_id(&self) -> UserId {
        self.0.user_id()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let IdentityUser(identity) = IdentityUser::from_request_parts(parts, state).await?;

        if !identity.is_admin() {
            tracing::warn!(user_id = %identity.user_id(), "Admin route refused");
            return Err(AppError::InsufficientPermissions.into());
        }

        Ok(AdminUser(identity))
    }
}

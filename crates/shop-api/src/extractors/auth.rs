//! Bearer token extractor
//!
//! Verifies the access token in the `Authorization` header. Used by the few
//! routes that are reachable without the gateway having checked the token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use shop_common::{AccessClaims, AppError, SessionValidator};
use shop_core::UserId;

use crate::response::ApiError;

/// Caller authenticated by a bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: AccessClaims,
}

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.claims.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionValidator: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::MissingAuth)?;

        let claims = SessionValidator::from_ref(state)
            .verify(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected access token");
                e
            })?;

        Ok(AuthUser { claims })
    }
}

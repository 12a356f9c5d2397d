//! Internal trust gate extractor

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use shop_common::{InternalTrustGate, INTERNAL_TOKEN_HEADER};

use crate::response::ApiError;

/// Marker for requests that presented the internal shared secret
#[derive(Debug, Clone, Copy)]
pub struct InternalCaller;

#[async_trait]
impl<S> FromRequestParts<S> for InternalCaller
where
    S: Send + Sync,
    InternalTrustGate: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(INTERNAL_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        InternalTrustGate::from_ref(state).check(presented).map_err(|e| {
            tracing::warn!(path = %parts.uri.path(), error = %e, "Internal route refused");
            e
        })?;

        Ok(InternalCaller)
    }
}

//! Pagination extractor
//!
//! Extracts page/limit/includeDeleted from the query string of the admin
//! listing; out-of-range values are clamped rather than rejected.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use shop_service::dto::UserListParams;

use crate::response::ApiError;

/// Validated page request
#[derive(Debug, Clone)]
pub struct Pagination(pub UserListParams);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<UserListParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        Ok(Pagination(params))
    }
}

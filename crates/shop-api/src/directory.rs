//! User directory served by the user-service over HTTP
//!
//! The auth-service reads owners of refresh tokens through
//! `GET /v1/users/internal/:id`, authenticated with the internal token.

use async_trait::async_trait;
use reqwest::Method;
use shop_common::{AppError, ServiceClient};
use shop_core::traits::{DirectoryEntry, RepoResult, UserDirectory};
use shop_core::{DomainError, UserId};
use shop_service::dto::InternalUserResponse;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: ServiceClient,
}

impl HttpUserDirectory {
    /// `client` must carry the internal token
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[instrument(skip(self))]
    async fn find_user(&self, id: UserId) -> RepoResult<Option<DirectoryEntry>> {
        let request = self
            .client
            .request(Method::GET, &format!("/v1/users/internal/{id}"));

        self.client
            .call_optional::<InternalUserResponse>(request)
            .await
            .map(|user| user.map(DirectoryEntry::from))
            .map_err(into_domain)
    }
}

fn into_domain(err: AppError) -> DomainError {
    match err {
        AppError::ServiceUnavailable(msg) => DomainError::DependencyUnavailable(msg),
        AppError::Upstream { status, message, .. } if status >= 500 => {
            DomainError::DependencyUnavailable(message)
        }
        other => DomainError::InternalError(other.to_string()),
    }
}

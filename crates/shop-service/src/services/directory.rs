//! User directory backed directly by a credential store
//!
//! Used when the token issuer runs in the same process as the user store
//! (tests, single-binary development setups). The auth-service binary talks
//! to the user-service over HTTP instead.

use std::sync::Arc;

use async_trait::async_trait;
use shop_core::traits::{DirectoryEntry, RepoResult, UserDirectory, UserRepository};
use shop_core::UserId;

#[derive(Clone)]
pub struct RepositoryUserDirectory {
    users: Arc<dyn UserRepository>,
}

impl RepositoryUserDirectory {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for RepositoryUserDirectory {
    async fn find_user(&self, id: UserId) -> RepoResult<Option<DirectoryEntry>> {
        Ok(self.users.find_by_id(id).await?.map(|user| DirectoryEntry {
            subject: user.subject(),
            status: user.status,
        }))
    }
}

impl std::fmt::Debug for RepositoryUserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryUserDirectory").finish_non_exhaustive()
    }
}

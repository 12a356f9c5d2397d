//! User administration
//!
//! Admin-only management of other users. Lookups here use the admin variant
//! of the store so soft-deleted users stay reachable for restore.

use chrono::Utc;
use shop_core::{DomainError, User, UserId, UserRole, UserStatus};
use tracing::{info, instrument};

use crate::dto::{AdminUpdateUserRequest, UserListParams, UserListResponse, UserResponse};

use super::context::UserContext;
use super::error::ServiceResult;

/// User administration service
pub struct UserAdminService<'a> {
    ctx: &'a UserContext,
}

impl<'a> UserAdminService<'a> {
    /// Create a new UserAdminService
    pub fn new(ctx: &'a UserContext) -> Self {
        Self { ctx }
    }

    /// Paginated listing, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, params: UserListParams) -> ServiceResult<UserListResponse> {
        let query = params.to_query();
        let page = self.ctx.user_repo().list(&query).await?;
        Ok(UserListResponse::from_page(page, &query))
    }

    /// Get any user, soft-deleted included
    #[instrument(skip(self))]
    pub async fn get(&self, id: UserId) -> ServiceResult<UserResponse> {
        let user = self.any_user(id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Update name, role or status. Admins cannot demote or block themselves.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        actor: UserId,
        id: UserId,
        request: AdminUpdateUserRequest,
    ) -> ServiceResult<UserResponse> {
        if actor == id {
            if request.role.is_some_and(|role| role != UserRole::Admin) {
                return Err(DomainError::CannotModifySelf("demote").into());
            }
            if request.status == Some(UserStatus::Blocked) {
                return Err(DomainError::CannotModifySelf("block").into());
            }
        }

        let mut user = self.any_user(id).await?;

        if let Some(full_name) = request.full_name {
            user.full_name = full_name.trim().to_string();
        }
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(status) = request.status {
            user.status = status;
        }
        user.updated_at = Utc::now();

        self.ctx.user_repo().update(&user).await?;

        info!(
            actor = %actor,
            user_id = %id,
            role = %user.role,
            status = %user.status,
            "User updated by admin"
        );

        Ok(UserResponse::from(&user))
    }

    /// Soft delete. Reversible with [`restore`](Self::restore).
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, actor: UserId, id: UserId) -> ServiceResult<()> {
        if actor == id {
            return Err(DomainError::CannotModifySelf("delete").into());
        }
        self.ctx.user_repo().soft_delete(id).await?;
        info!(actor = %actor, user_id = %id, "User soft-deleted");
        Ok(())
    }

    /// Undo a soft delete
    #[instrument(skip(self))]
    pub async fn restore(&self, id: UserId) -> ServiceResult<UserResponse> {
        self.ctx.user_repo().restore(id).await?;
        let user = self.any_user(id).await?;
        info!(user_id = %id, "User restored");
        Ok(UserResponse::from(&user))
    }

    /// Irreversibly remove a user
    #[instrument(skip(self))]
    pub async fn delete_permanently(&self, actor: UserId, id: UserId) -> ServiceResult<()> {
        if actor == id {
            return Err(DomainError::CannotModifySelf("delete").into());
        }
        self.ctx.user_repo().delete_permanently(id).await?;
        info!(actor = %actor, user_id = %id, "User permanently deleted");
        Ok(())
    }

    async fn any_user(&self, id: UserId) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id_admin(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))?)
    }
}

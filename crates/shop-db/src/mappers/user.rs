//! User entity <-> model mapper

use shop_core::{DomainError, User, UserId};

use crate::models::UserModel;

/// Role and status are stored as text; an unknown value means the row was
/// written by something other than this crate.
impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let role = model
            .role
            .parse()
            .map_err(|_| DomainError::DatabaseError(format!("invalid role '{}'", model.role)))?;
        let status = model
            .status
            .parse()
            .map_err(|_| DomainError::DatabaseError(format!("invalid status '{}'", model.status)))?;

        Ok(User {
            id: UserId::from_uuid(model.id),
            email: model.email,
            full_name: model.full_name,
            role,
            status,
            last_login_at: model.last_login_at,
            deleted_at: model.deleted_at,
            reset_token_hash: model.reset_token_hash,
            reset_token_expires_at: model.reset_token_expires_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

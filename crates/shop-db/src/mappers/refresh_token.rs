//! RefreshToken entity <-> model mapper

use shop_core::{RefreshToken, UserId};

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: model.id,
            user_id: UserId::from_uuid(model.user_id),
            token_hash: model.token_hash,
            expires_at: model.expires_at,
            revoked: model.revoked,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

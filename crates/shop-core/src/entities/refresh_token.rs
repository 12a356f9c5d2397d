//! Refresh token record
//!
//! Only the SHA-256 digest of the opaque token string is persisted.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::UserId;

/// Observable state of a stored refresh token at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenState {
    Active,
    Expired,
    Revoked,
}

/// Persisted refresh token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RefreshToken {
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Expiry is reported ahead of revocation
    pub fn state_at(&self, now: DateTime<Utc>) -> RefreshTokenState {
        if self.is_expired_at(now) {
            RefreshTokenState::Expired
        } else if self.revoked {
            RefreshTokenState::Revoked
        } else {
            RefreshTokenState::Active
        }
    }
}

/// Values for inserting a new refresh token row
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

impl NewRefreshToken {
    /// Materialise the row as the store would persist it
    pub fn into_record(self, now: DateTime<Utc>) -> RefreshToken {
        RefreshToken {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            token_hash: self.token_hash,
            expires_at: self.expires_at,
            revoked: false,
            created_at: now,
            updated_at: now,
        }
    }
}

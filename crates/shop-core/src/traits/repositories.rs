//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{NewRefreshToken, RefreshToken, TokenSubject, User, UserStatus};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository (credential store)
// ============================================================================

/// Page request for the admin user listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    /// Include soft-deleted users
    pub include_deleted: bool,
}

impl Default for UserListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            include_deleted: false,
        }
    }
}

impl UserListQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// One page of users plus the total matching count
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID, excluding soft-deleted users
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by email, excluding soft-deleted users
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Admin lookup by ID that also returns soft-deleted users
    async fn find_by_id_admin(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find a non-deleted user holding the given reset-token digest
    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<User>>;

    /// Check if email is taken by any non-destroyed user (soft-deleted included)
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Persist name, role and status of an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Update password hash and clear any outstanding reset token
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Mark active and stamp last login. Blocked users are left unchanged.
    async fn set_active_status(&self, id: UserId) -> RepoResult<()>;

    /// Mark inactive if currently active
    async fn set_inactive_status(&self, id: UserId) -> RepoResult<()>;

    /// Store (or clear, with `None`) the password-reset token digest
    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> RepoResult<()>;

    /// Soft delete a user
    async fn soft_delete(&self, id: UserId) -> RepoResult<()>;

    /// Undo a soft delete
    async fn restore(&self, id: UserId) -> RepoResult<()>;

    /// Remove the row for good
    async fn delete_permanently(&self, id: UserId) -> RepoResult<()>;

    /// Paginated listing ordered by creation time, newest first
    async fn list(&self, query: &UserListQuery) -> RepoResult<UserPage>;
}

// ============================================================================
// Refresh Token Repository
// ============================================================================

/// Result of an atomic compare-and-rotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotateOutcome {
    /// The old row was revoked and its successor stored
    Rotated(RefreshToken),
    NotFound,
    Expired,
    Revoked,
}

/// Result of revoking a single refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked,
    NotFound,
    AlreadyRevoked,
}

impl RevokeOutcome {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Revoked => "REVOKED",
            Self::NotFound => "TOKEN_NOT_FOUND",
            Self::AlreadyRevoked => "TOKEN_ALREADY_REVOKED",
        }
    }
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Insert a new token row. A digest collision is a `DuplicateToken` error.
    async fn insert(&self, token: NewRefreshToken) -> RepoResult<RefreshToken>;

    /// Find a token row by digest regardless of state
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>>;

    /// Revoke `old_hash` and insert `replacement` as one atomic step.
    ///
    /// Only a non-revoked, unexpired row can be rotated; of two concurrent
    /// callers presenting the same digest exactly one observes `Rotated`.
    async fn rotate(
        &self,
        old_hash: &str,
        replacement: NewRefreshToken,
    ) -> RepoResult<RotateOutcome>;

    /// Revoke a single token
    async fn revoke(&self, token_hash: &str) -> RepoResult<RevokeOutcome>;

    /// Revoke every non-revoked token of a user, returning how many changed
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64>;

    /// Count non-revoked, unexpired tokens of a user
    async fn count_active_for_user(&self, user_id: UserId) -> RepoResult<u64>;

    /// Delete rows whose expiry is at or before `now`
    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// User Directory
// ============================================================================

/// Identity plus account status as seen by the token issuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub subject: TokenSubject,
    pub status: UserStatus,
}

/// Read-only view of the credential store used when rotating tokens.
///
/// The auth-service resolves this over HTTP against the user-service;
/// single-process setups can back it with a `UserRepository` directly.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a non-deleted user
    async fn find_user(&self, id: UserId) -> RepoResult<Option<DirectoryEntry>>;
}

//! Token issuer
//!
//! Issues access/refresh pairs, rotates refresh tokens, and revokes them.
//! Refresh tokens are opaque random strings; only their SHA-256 digest is
//! stored.

use chrono::Utc;
use shop_common::auth::{generate_opaque_token, hash_token, AccessClaims};
use shop_core::{
    DomainError, NewRefreshToken, RefreshTokenState, RevokeOutcome, RotateOutcome, TokenSubject,
    UserId, UserStatus,
};
use tracing::{debug, info, instrument, warn};

use crate::dto::{CreateTokensRequest, TokenPairResponse};

use super::context::AuthContext;
use super::error::{ServiceError, ServiceResult};

/// Token issuer service
pub struct TokenService<'a> {
    ctx: &'a AuthContext,
}

impl<'a> TokenService<'a> {
    /// Create a new TokenService
    pub fn new(ctx: &'a AuthContext) -> Self {
        Self { ctx }
    }

    /// Issue a token pair for a user whose credentials were already checked
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_token_pair(
        &self,
        request: CreateTokensRequest,
    ) -> ServiceResult<TokenPairResponse> {
        let id = request
            .id
            .as_deref()
            .and_then(|raw| UserId::parse(raw).ok())
            .filter(|id| !id.is_nil())
            .ok_or(DomainError::InvalidUser)?;

        let subject = TokenSubject {
            id,
            email: request.email,
            role: request.role,
        };

        let pair = self.issue(&subject).await?;
        info!(user_id = %id, "Token pair issued");
        Ok(pair)
    }

    /// Verify an access token and return its claims
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> ServiceResult<AccessClaims> {
        Ok(self.ctx.jwt_service().verify(token)?)
    }

    /// Exchange a refresh token for a new pair, revoking the old token.
    ///
    /// Expiry is reported before revocation. The owner is re-read from the
    /// directory so deleted or blocked accounts cannot keep refreshing, and the
    /// new access token carries their current email and role.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPairResponse> {
        let token_hash = hash_token(refresh_token);
        let now = Utc::now();

        let record = self
            .ctx
            .refresh_repo()
            .find_by_hash(&token_hash)
            .await?
            .ok_or_else(|| {
                debug!("Refresh rejected: unknown token");
                DomainError::TokenNotFound
            })?;

        match record.state_at(now) {
            RefreshTokenState::Active => {}
            RefreshTokenState::Expired => return Err(DomainError::TokenExpired.into()),
            RefreshTokenState::Revoked => {
                warn!(user_id = %record.user_id, "Refresh rejected: token already revoked");
                return Err(DomainError::TokenRevoked.into());
            }
        }

        let entry = self
            .ctx
            .directory()
            .find_user(record.user_id)
            .await?
            .ok_or(DomainError::AccountDoesNotExist)?;

        if entry.status == UserStatus::Blocked {
            warn!(user_id = %record.user_id, "Refresh rejected: account blocked");
            return Err(DomainError::AccountBlocked.into());
        }

        let raw = generate_opaque_token();
        let replacement = NewRefreshToken {
            user_id: entry.subject.id,
            token_hash: hash_token(&raw),
            expires_at: now + self.ctx.refresh_token_ttl(),
        };

        match self.ctx.refresh_repo().rotate(&token_hash, replacement).await? {
            RotateOutcome::Rotated(_) => {}
            RotateOutcome::NotFound => return Err(DomainError::TokenNotFound.into()),
            RotateOutcome::Expired => return Err(DomainError::TokenExpired.into()),
            RotateOutcome::Revoked => {
                warn!(user_id = %record.user_id, "Refresh lost rotation race");
                return Err(DomainError::TokenRevoked.into());
            }
        }

        let access_token = self.ctx.jwt_service().issue_access_token(&entry.subject)?;

        info!(user_id = %entry.subject.id, "Refresh token rotated");

        Ok(TokenPairResponse {
            access_token,
            refresh_token: raw,
            expires_in: self.ctx.jwt_service().access_token_ttl(),
        })
    }

    /// Revoke one refresh token. Unknown and already-revoked tokens are
    /// reported, not treated as errors.
    #[instrument(skip_all)]
    pub async fn revoke(&self, refresh_token: &str) -> ServiceResult<RevokeOutcome> {
        let outcome = self
            .ctx
            .refresh_repo()
            .revoke(&hash_token(refresh_token))
            .await?;

        debug!(outcome = outcome.code(), "Refresh token revocation");
        Ok(outcome)
    }

    /// Revoke every refresh token of a user (logout from all devices)
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, user_id: UserId) -> ServiceResult<u64> {
        let count = self.ctx.refresh_repo().revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked = count, "All refresh tokens revoked");
        Ok(count)
    }

    /// Number of live refresh tokens held by a user
    #[instrument(skip(self))]
    pub async fn active_session_count(&self, user_id: UserId) -> ServiceResult<u64> {
        Ok(self.ctx.refresh_repo().count_active_for_user(user_id).await?)
    }

    /// Delete refresh tokens whose expiry has passed
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> ServiceResult<u64> {
        let purged = self.ctx.refresh_repo().purge_expired(Utc::now()).await?;
        if purged > 0 {
            info!(purged, "Expired refresh tokens purged");
        }
        Ok(purged)
    }

    async fn issue(&self, subject: &TokenSubject) -> ServiceResult<TokenPairResponse> {
        let access_token = self.ctx.jwt_service().issue_access_token(subject)?;

        let raw = generate_opaque_token();
        self.ctx
            .refresh_repo()
            .insert(NewRefreshToken {
                user_id: subject.id,
                token_hash: hash_token(&raw),
                expires_at: Utc::now() + self.ctx.refresh_token_ttl(),
            })
            .await?;

        Ok(TokenPairResponse {
            access_token,
            refresh_token: raw,
            expires_in: self.ctx.jwt_service().access_token_ttl(),
        })
    }
}

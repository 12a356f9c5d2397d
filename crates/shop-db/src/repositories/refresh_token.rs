//! PostgreSQL implementation of RefreshTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use shop_core::{
    DomainError, NewRefreshToken, RefreshToken, RefreshTokenRepository, RefreshTokenState,
    RepoResult, RevokeOutcome, RotateOutcome, UserId,
};

use crate::models::RefreshTokenModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RefreshTokenRepository
#[derive(Clone)]
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    /// Create a new PgRefreshTokenRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn insert_sql() -> String {
        format!(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, FALSE, NOW(), NOW()) \
             RETURNING {}",
            RefreshTokenModel::COLUMNS
        )
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id))]
    async fn insert(&self, token: NewRefreshToken) -> RepoResult<RefreshToken> {
        let model = sqlx::query_as::<_, RefreshTokenModel>(&Self::insert_sql())
            .bind(Uuid::new_v4())
            .bind(token.user_id.into_inner())
            .bind(&token.token_hash)
            .bind(token.expires_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::DuplicateToken))?;

        Ok(model.into())
    }

    #[instrument(skip_all)]
    async fn find_by_hash(&self, token_hash: &str) -> RepoResult<Option<RefreshToken>> {
        let sql = format!(
            "SELECT {} FROM refresh_tokens WHERE token_hash = $1",
            RefreshTokenModel::COLUMNS
        );
        let model = sqlx::query_as::<_, RefreshTokenModel>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(model.map(RefreshToken::from))
    }

    #[instrument(skip_all, fields(user_id = %replacement.user_id))]
    async fn rotate(
        &self,
        old_hash: &str,
        replacement: NewRefreshToken,
    ) -> RepoResult<RotateOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Row lock: a concurrent rotation of the same digest waits here and
        // then sees revoked = TRUE.
        let claimed = sqlx::query_scalar::<_, Uuid>(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = $2
            WHERE token_hash = $1 AND revoked = FALSE AND expires_at > $2
            RETURNING user_id
            ",
        )
        .bind(old_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let Some(owner) = claimed else {
            tx.rollback().await.map_err(map_db_error)?;
            let outcome = match self.find_by_hash(old_hash).await? {
                None => RotateOutcome::NotFound,
                // Same clock as the UPDATE, so an unclaimed live row was taken
                // by a concurrent rotation.
                Some(row) => match row.state_at(now) {
                    RefreshTokenState::Expired => RotateOutcome::Expired,
                    RefreshTokenState::Revoked | RefreshTokenState::Active => RotateOutcome::Revoked,
                },
            };
            return Ok(outcome);
        };

        if owner != replacement.user_id.into_inner() {
            tx.rollback().await.map_err(map_db_error)?;
            return Err(DomainError::InternalError(
                "replacement token belongs to a different user".to_string(),
            ));
        }

        let model = sqlx::query_as::<_, RefreshTokenModel>(&Self::insert_sql())
            .bind(Uuid::new_v4())
            .bind(replacement.user_id.into_inner())
            .bind(&replacement.token_hash)
            .bind(replacement.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, || DomainError::DuplicateToken))?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(RotateOutcome::Rotated(model.into()))
    }

    #[instrument(skip_all)]
    async fn revoke(&self, token_hash: &str) -> RepoResult<RevokeOutcome> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = NOW()
            WHERE token_hash = $1 AND revoked = FALSE
            ",
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() > 0 {
            return Ok(RevokeOutcome::Revoked);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM refresh_tokens WHERE token_hash = $1)",
        )
        .bind(token_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(if exists {
            RevokeOutcome::AlreadyRevoked
        } else {
            RevokeOutcome::NotFound
        })
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE refresh_tokens
            SET revoked = TRUE, updated_at = NOW()
            WHERE user_id = $1 AND revoked = FALSE
            ",
        )
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn count_active_for_user(&self, user_id: UserId) -> RepoResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM refresh_tokens
            WHERE user_id = $1 AND revoked = FALSE AND expires_at > NOW()
            ",
        )
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

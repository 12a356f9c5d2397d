//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgQueryResult;
use sqlx::{PgPool, Postgres};
use tracing::instrument;

use shop_core::{DomainError, RepoResult, User, UserId, UserListQuery, UserPage, UserRepository};

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation, page_bounds, user_not_found};

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where<T>(&self, predicate: &str, value: T) -> RepoResult<Option<User>>
    where
        T: for<'q> sqlx::Encode<'q, Postgres> + sqlx::Type<Postgres> + Send + 'static,
    {
        let sql = format!("SELECT {} FROM users WHERE {predicate}", UserModel::COLUMNS);
        let model = sqlx::query_as::<_, UserModel>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        model.map(User::try_from).transpose()
    }
}

fn expect_affected(result: &PgQueryResult, id: UserId) -> RepoResult<()> {
    if result.rows_affected() == 0 {
        return Err(user_not_found(id));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.fetch_one_where("id = $1 AND deleted_at IS NULL", id.into_inner()).await
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.fetch_one_where("email = $1 AND deleted_at IS NULL", email.to_string()).await
    }

    #[instrument(skip(self))]
    async fn find_by_id_admin(&self, id: UserId) -> RepoResult<Option<User>> {
        self.fetch_one_where("id = $1", id.into_inner()).await
    }

    #[instrument(skip(self, token_hash))]
    async fn find_by_reset_token(&self, token_hash: &str) -> RepoResult<Option<User>> {
        self.fetch_one_where(
            "reset_token_hash = $1 AND deleted_at IS NULL",
            token_hash.to_string(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            ",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, password_hash, full_name, role, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET full_name = $2, role = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, user.id)
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        let result = sqlx::query_scalar::<_, String>(
            r"
            SELECT password_hash FROM users WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET password_hash = $2,
                reset_token_hash = NULL,
                reset_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self))]
    async fn set_active_status(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET status = CASE WHEN status = 'blocked' THEN status ELSE 'active' END,
                last_login_at = CASE WHEN status = 'blocked' THEN last_login_at ELSE NOW() END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self))]
    async fn set_inactive_status(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET status = CASE WHEN status = 'active' THEN 'inactive' ELSE status END,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self, token))]
    async fn set_reset_token(
        &self,
        id: UserId,
        token: Option<(&str, DateTime<Utc>)>,
    ) -> RepoResult<()> {
        let (hash, expires_at) = match token {
            Some((hash, expires_at)) => (Some(hash), Some(expires_at)),
            None => (None, None),
        };

        let result = sqlx::query(
            r"
            UPDATE users
            SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self))]
    async fn restore(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET deleted_at = NULL, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NOT NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            // Distinguish "no such user" from "not deleted"
            return match self.find_by_id_admin(id).await? {
                Some(_) => Err(DomainError::UserNotDeleted),
                None => Err(user_not_found(id)),
            };
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_permanently(&self, id: UserId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        expect_affected(&result, id)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: &UserListQuery) -> RepoResult<UserPage> {
        let (limit, offset) = page_bounds(query.limit, query.offset());

        let sql = format!(
            "SELECT {} FROM users WHERE ($1 OR deleted_at IS NULL) \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
            UserModel::COLUMNS
        );
        let models = sqlx::query_as::<_, UserModel>(&sql)
            .bind(query.include_deleted)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE ($1 OR deleted_at IS NULL)",
        )
        .bind(query.include_deleted)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let users = models
            .into_iter()
            .map(User::try_from)
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(UserPage {
            users,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}

//! Account service
//!
//! The credential store's authentication slice plus self-service account
//! operations: registration, credential checks, logout, profile, password
//! change and password reset.

use chrono::Utc;
use shop_common::auth::{generate_opaque_token, hash_token, validate_password_strength};
use shop_common::AppError;
use shop_core::{DomainError, User, UserId};
use tracing::{info, instrument, warn};

use crate::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, InternalUserResponse, LoginRequest,
    LoginResponse, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, UserResponse,
};

use super::context::UserContext;
use super::error::ServiceResult;

/// Account service
pub struct AccountService<'a> {
    ctx: &'a UserContext,
}

impl<'a> AccountService<'a> {
    /// Create a new AccountService
    pub fn new(ctx: &'a UserContext) -> Self {
        Self { ctx }
    }

    /// Register a new user. New accounts start `inactive` until their first login.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<UserResponse> {
        ensure_strong(&request.password)?;

        let email = User::normalize_email(&request.email);

        // Soft-deleted users keep their email reserved
        if self.ctx.user_repo().email_exists(&email).await? {
            return Err(DomainError::EmailAlreadyExists.into());
        }

        let password_hash = self.ctx.password_service().hash(&request.password)?;
        let user = User::new(email, request.full_name.trim().to_string());

        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered successfully");

        Ok(UserResponse::from(&user))
    }

    /// Check credentials and mark the account active.
    ///
    /// Unknown and soft-deleted accounts are indistinguishable from each other
    /// and pay the same hashing cost as a real comparison. Blocked accounts are
    /// only reported once the password has matched.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let email = User::normalize_email(&request.email);
        let passwords = self.ctx.password_service();

        let Some(mut user) = self.ctx.user_repo().find_by_email(&email).await? else {
            passwords.compare_against_dummy(&request.password);
            warn!("Login failed: account does not exist");
            return Err(DomainError::AccountDoesNotExist.into());
        };

        let Some(password_hash) = self.ctx.user_repo().get_password_hash(user.id).await? else {
            passwords.compare_against_dummy(&request.password);
            warn!(user_id = %user.id, "Login failed: no password hash");
            return Err(DomainError::AccountDoesNotExist.into());
        };

        if !passwords.compare(&request.password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: incorrect password");
            return Err(DomainError::IncorrectPassword.into());
        }

        if user.is_blocked() {
            warn!(user_id = %user.id, "Login refused: account blocked");
            return Err(DomainError::AccountBlocked.into());
        }

        self.ctx.user_repo().set_active_status(user.id).await?;
        user.mark_logged_in(Utc::now());

        info!(user_id = %user.id, "User logged in successfully");

        Ok(LoginResponse {
            user: UserResponse::from(&user),
        })
    }

    /// Mark the account inactive. Blocked accounts stay blocked.
    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: UserId) -> ServiceResult<()> {
        self.ctx.user_repo().set_inactive_status(user_id).await?;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Get the caller's own profile
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: UserId) -> ServiceResult<UserResponse> {
        let user = self.live_user(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Update the caller's own profile
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        request: UpdateProfileRequest,
    ) -> ServiceResult<UserResponse> {
        let mut user = self.live_user(user_id).await?;

        if let Some(full_name) = request.full_name {
            user.full_name = full_name.trim().to_string();
        }
        user.updated_at = Utc::now();

        self.ctx.user_repo().update(&user).await?;

        Ok(UserResponse::from(&user))
    }

    /// Change the caller's password after re-checking the current one
    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: UserId,
        request: ChangePasswordRequest,
    ) -> ServiceResult<()> {
        let current_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?;

        let passwords = self.ctx.password_service();
        if !passwords.compare(&request.current_password, &current_hash)? {
            warn!(user_id = %user_id, "Password change refused: incorrect password");
            return Err(DomainError::IncorrectPassword.into());
        }

        ensure_strong(&request.new_password)?;

        let new_hash = passwords.hash(&request.new_password)?;
        self.ctx.user_repo().update_password(user_id, &new_hash).await?;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Issue a password reset token. Succeeds silently for unknown emails so
    /// the endpoint cannot be used to probe for accounts.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<()> {
        let email = User::normalize_email(&request.email);

        let Some(user) = self.ctx.user_repo().find_by_email(&email).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = generate_opaque_token();
        let expires_at = Utc::now() + self.ctx.password_reset_ttl();

        self.ctx
            .user_repo()
            .set_reset_token(user.id, Some((&hash_token(&token), expires_at)))
            .await?;

        self.ctx
            .notifier()
            .send_reset_token(&user, &token, expires_at)
            .await?;

        info!(user_id = %user.id, "Password reset token issued");
        Ok(())
    }

    /// Set a new password using a reset token. The token is consumed.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        ensure_strong(&request.new_password)?;

        let token_hash = hash_token(&request.token);
        let user = self
            .ctx
            .user_repo()
            .find_by_reset_token(&token_hash)
            .await?
            .filter(|user| user.reset_token_matches(&token_hash, Utc::now()))
            .ok_or(DomainError::InvalidResetToken)?;

        let new_hash = self.ctx.password_service().hash(&request.new_password)?;
        self.ctx.user_repo().update_password(user.id, &new_hash).await?;

        info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }

    /// Identity and status of a non-deleted user, for other services
    #[instrument(skip(self))]
    pub async fn internal_user(&self, user_id: UserId) -> ServiceResult<InternalUserResponse> {
        let user = self.live_user(user_id).await?;
        Ok(InternalUserResponse::from(&user))
    }

    async fn live_user(&self, user_id: UserId) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }
}

/// Password strength failures surface as `WeakPassword`
fn ensure_strong(password: &str) -> ServiceResult<()> {
    validate_password_strength(password).map_err(|e| match e {
        AppError::Validation(msg) => DomainError::WeakPassword(msg).into(),
        other => other.into(),
    })
}

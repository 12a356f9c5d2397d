//! Service contexts - dependency containers for services
//!
//! The auth-service and the user-service own different slices of state, so
//! each gets its own context. Both are cheap to clone.

use std::sync::Arc;

use chrono::Duration;
use shop_common::auth::{JwtService, PasswordService};
use shop_core::traits::{RefreshTokenRepository, UserDirectory, UserRepository};

use super::error::{ServiceError, ServiceResult};
use super::notifier::{LoggingResetNotifier, ResetTokenNotifier};

/// Default refresh token lifetime (7 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Default password reset token lifetime (1 hour)
pub const DEFAULT_PASSWORD_RESET_TTL_SECS: i64 = 60 * 60;

// ============================================================================
// Auth Context
// ============================================================================

/// Dependencies of the token issuer
///
/// - refresh token store
/// - user directory (who a refresh token belongs to, and whether they may still use it)
/// - JWT service for signing access tokens
#[derive(Clone)]
pub struct AuthContext {
    refresh_repo: Arc<dyn RefreshTokenRepository>,
    directory: Arc<dyn UserDirectory>,
    jwt_service: Arc<JwtService>,
    refresh_token_ttl: Duration,
}

impl AuthContext {
    pub fn new(
        refresh_repo: Arc<dyn RefreshTokenRepository>,
        directory: Arc<dyn UserDirectory>,
        jwt_service: Arc<JwtService>,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            refresh_repo,
            directory,
            jwt_service,
            refresh_token_ttl,
        }
    }

    /// Get the refresh token repository
    pub fn refresh_repo(&self) -> &dyn RefreshTokenRepository {
        self.refresh_repo.as_ref()
    }

    /// Get the user directory
    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Lifetime of newly issued refresh tokens
    pub fn refresh_token_ttl(&self) -> Duration {
        self.refresh_token_ttl
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("refresh_repo", &"...")
            .field("directory", &"...")
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Builder for creating AuthContext
#[derive(Default)]
pub struct AuthContextBuilder {
    refresh_repo: Option<Arc<dyn RefreshTokenRepository>>,
    directory: Option<Arc<dyn UserDirectory>>,
    jwt_service: Option<Arc<JwtService>>,
    refresh_token_ttl: Option<Duration>,
}

impl AuthContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_repo(mut self, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        self.refresh_repo = Some(repo);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    /// Refresh token lifetime in seconds
    pub fn refresh_token_ttl(mut self, seconds: i64) -> Self {
        self.refresh_token_ttl = Some(Duration::seconds(seconds));
        self
    }

    /// Build the AuthContext
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` if any required dependency is missing
    pub fn build(self) -> ServiceResult<AuthContext> {
        Ok(AuthContext::new(
            self.refresh_repo
                .ok_or_else(|| ServiceError::MissingDependency("refresh_repo"))?,
            self.directory
                .ok_or_else(|| ServiceError::MissingDependency("directory"))?,
            self.jwt_service
                .ok_or_else(|| ServiceError::MissingDependency("jwt_service"))?,
            self.refresh_token_ttl
                .unwrap_or_else(|| Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECS)),
        ))
    }
}

// ============================================================================
// User Context
// ============================================================================

/// Dependencies of the credential store services
#[derive(Clone)]
pub struct UserContext {
    user_repo: Arc<dyn UserRepository>,
    password_service: PasswordService,
    notifier: Arc<dyn ResetTokenNotifier>,
    password_reset_ttl: Duration,
}

impl UserContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: PasswordService,
        notifier: Arc<dyn ResetTokenNotifier>,
        password_reset_ttl: Duration,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            notifier,
            password_reset_ttl,
        }
    }

    /// Get the user repository
    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    /// Get the password hasher
    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    /// Get the reset token notifier
    pub fn notifier(&self) -> &dyn ResetTokenNotifier {
        self.notifier.as_ref()
    }

    pub fn password_reset_ttl(&self) -> Duration {
        self.password_reset_ttl
    }
}

impl std::fmt::Debug for UserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserContext")
            .field("user_repo", &"...")
            .field("password_service", &self.password_service)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .finish()
    }
}

/// Builder for creating UserContext
#[derive(Default)]
pub struct UserContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    password_service: Option<PasswordService>,
    notifier: Option<Arc<dyn ResetTokenNotifier>>,
    password_reset_ttl: Option<Duration>,
}

impl UserContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn password_service(mut self, service: PasswordService) -> Self {
        self.password_service = Some(service);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn ResetTokenNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Password reset token lifetime in seconds
    pub fn password_reset_ttl(mut self, seconds: i64) -> Self {
        self.password_reset_ttl = Some(Duration::seconds(seconds));
        self
    }

    /// Build the UserContext
    ///
    /// # Errors
    /// Returns `ServiceError::MissingDependency` if the user repository is missing
    pub fn build(self) -> ServiceResult<UserContext> {
        Ok(UserContext::new(
            self.user_repo
                .ok_or_else(|| ServiceError::MissingDependency("user_repo"))?,
            self.password_service.unwrap_or_default(),
            self.notifier
                .unwrap_or_else(|| Arc::new(LoggingResetNotifier)),
            self.password_reset_ttl
                .unwrap_or_else(|| Duration::seconds(DEFAULT_PASSWORD_RESET_TTL_SECS)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_builder_requires_dependencies() {
        let err = AuthContextBuilder::new().build().unwrap_err();
        assert!(matches!(err, ServiceError::MissingDependency("refresh_repo")));
    }

    #[test]
    fn test_user_builder_requires_repository() {
        let err = UserContextBuilder::new().build().unwrap_err();
        assert!(matches!(err, ServiceError::MissingDependency("user_repo")));
    }
}

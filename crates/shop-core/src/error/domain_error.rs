//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::UserId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("Account does not exist")]
    AccountDoesNotExist,

    #[error("Password is not correct")]
    IncorrectPassword,

    #[error("Refresh token not found")]
    TokenNotFound,

    #[error("Refresh token has expired")]
    TokenExpired,

    #[error("Refresh token has been revoked")]
    TokenRevoked,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Administrators cannot {0} their own account")]
    CannotModifySelf(&'static str),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid user: missing id")]
    InvalidUser,

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Reset token is invalid or has expired")]
    InvalidResetToken,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Refresh token already issued")]
    DuplicateToken,

    #[error("User is not deleted")]
    UserNotDeleted,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// A collaborating service could not be reached
    #[error("Service unavailable: {0}")]
    DependencyUnavailable(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Authentication
            Self::AccountDoesNotExist => "ACCOUNT_DOES_NOT_EXIST",
            Self::IncorrectPassword => "INCORRECT_PASSWORD",
            Self::TokenNotFound => "TOKEN_NOT_FOUND",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",

            // Authorization
            Self::AccountBlocked => "ACCOUNT_BLOCKED",
            Self::CannotModifySelf(_) => "CANNOT_MODIFY_SELF",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidUser => "INVALID_USER",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidResetToken => "INVALID_RESET_TOKEN",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::DuplicateToken => "DUPLICATE_TOKEN",
            Self::UserNotDeleted => "USER_NOT_DELETED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
            Self::DependencyUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if the caller failed to authenticate (bad credentials or token)
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::AccountDoesNotExist
                | Self::IncorrectPassword
                | Self::TokenNotFound
                | Self::TokenExpired
                | Self::TokenRevoked
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidUser
                | Self::WeakPassword(_)
                | Self::InvalidResetToken
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::AccountBlocked | Self::CannotModifySelf(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists | Self::DuplicateToken | Self::UserNotDeleted
        )
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.is_unauthenticated() {
            401
        } else if self.is_authorization() {
            403
        } else if self.is_validation() {
            400
        } else if self.is_conflict() {
            409
        } else if matches!(self, Self::DependencyUnavailable(_)) {
            503
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::TokenRevoked.code(), "TOKEN_REVOKED");
        assert_eq!(DomainError::IncorrectPassword.code(), "INCORRECT_PASSWORD");
        assert_eq!(DomainError::UserNotFound(UserId::new()).code(), "UNKNOWN_USER");
    }

    #[test]
    fn test_token_failures_are_unauthenticated() {
        assert_eq!(DomainError::TokenNotFound.status_code(), 401);
        assert_eq!(DomainError::TokenExpired.status_code(), 401);
        assert_eq!(DomainError::TokenRevoked.status_code(), 401);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DomainError::UserNotFound(UserId::new()).status_code(), 404);
        assert_eq!(DomainError::AccountBlocked.status_code(), 403);
        assert_eq!(DomainError::InvalidUser.status_code(), 400);
        assert_eq!(DomainError::EmailAlreadyExists.status_code(), 409);
        assert_eq!(DomainError::DatabaseError("x".to_string()).status_code(), 500);
        assert_eq!(
            DomainError::DependencyUnavailable("user-service".to_string()).status_code(),
            503
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DomainError::IncorrectPassword.to_string(), "Password is not correct");
        assert_eq!(DomainError::AccountDoesNotExist.to_string(), "Account does not exist");
        assert_eq!(
            DomainError::CannotModifySelf("delete").to_string(),
            "Administrators cannot delete their own account"
        );
    }
}

//! # shop-service
//!
//! Application layer: the token issuer, the credential-store operations of the
//! user-service and admin user management, plus their DTOs.

pub mod dto;
pub mod services;

pub use services::{
    AccountService, AuthContext, AuthContextBuilder, LoggingResetNotifier,
    RepositoryUserDirectory, ResetTokenNotifier, ServiceError, ServiceResult, TokenService,
    UserAdminService, UserContext, UserContextBuilder,
};

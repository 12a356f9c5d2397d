//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AdminUpdateUserRequest, ChangePasswordRequest, CreateTokensRequest, ForgotPasswordRequest,
    LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest, ResetPasswordRequest,
    RevokeTokenRequest, UpdateProfileRequest, UserListParams, VerifyTokenRequest,
};

pub use responses::{
    HealthResponse, InternalUserResponse, LoginResponse, PurgeResponse, RevokeAllResponse,
    RevokeTokenResponse, SessionResponse, SessionsResponse, TokenPairResponse, UserListResponse,
    UserResponse,
};

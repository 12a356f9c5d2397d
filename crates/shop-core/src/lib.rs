//! # shop-core
//!
//! Domain layer for the storefront identity slice: users, refresh-token records,
//! the claims subject carried by access tokens, and the repository traits the
//! persistence layer implements.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    NewRefreshToken, RefreshToken, RefreshTokenState, TokenSubject, User, UserRole, UserStatus,
};
pub use error::DomainError;
pub use traits::{
    DirectoryEntry, RefreshTokenRepository, RepoResult, RevokeOutcome, RotateOutcome,
    UserDirectory, UserListQuery, UserPage, UserRepository,
};
pub use value_objects::{UserId, UserIdParseError};

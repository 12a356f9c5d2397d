//! Repository traits (ports)

mod repositories;

pub use repositories::{
    DirectoryEntry, RefreshTokenRepository, RepoResult, RevokeOutcome, RotateOutcome,
    UserDirectory, UserListQuery, UserPage, UserRepository,
};

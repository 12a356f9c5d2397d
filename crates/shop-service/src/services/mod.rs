//! Business logic services
//!
//! Services borrow a context holding their dependencies and are cheap to
//! construct per request.

pub mod account;
pub mod admin;
pub mod context;
pub mod directory;
pub mod error;
pub mod notifier;
pub mod token;

pub use account::AccountService;
pub use admin::UserAdminService;
pub use context::{AuthContext, AuthContextBuilder, UserContext, UserContextBuilder};
pub use directory::RepositoryUserDirectory;
pub use error::{ServiceError, ServiceResult};
pub use notifier::{LoggingResetNotifier, ResetTokenNotifier};
pub use token::TokenService;
